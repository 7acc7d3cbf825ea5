use crate::application::dto::ScanOptions;
use crate::shared::error::ScanError;
use crate::shared::Result;

/// Environment variable naming the scanner release to download
pub const RELEASE_VERSION_ENV: &str = "DETECT_LATEST_RELEASE_VERSION";

/// Scanner major version used when nothing else is configured
pub const DEFAULT_SCANNER_MAJOR: u32 = 7;

/// Local file name of the downloaded scanner script
pub const SCANNER_SCRIPT: &str = "detect.sh";

/// Which scanner script to download for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerRelease {
    pub major: u32,
    pub download_url: String,
}

impl ScannerRelease {
    /// Resolves the release: explicit override, then the release version from
    /// the custom environment, then from `process_env`, then the default.
    pub fn resolve<F>(options: &ScanOptions, process_env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let custom_env = options.environment()?;
        let requested = options
            .scanner_version_override
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                custom_env
                    .into_iter()
                    .find(|(key, _)| key == RELEASE_VERSION_ENV)
                    .map(|(_, value)| value)
            })
            .or_else(|| process_env(RELEASE_VERSION_ENV))
            .filter(|v| !v.trim().is_empty());

        let major = match requested {
            Some(version) => parse_major(&version).ok_or_else(|| ScanError::Validation {
                message: format!("cannot determine the scanner major version from '{}'", version),
            })?,
            None => DEFAULT_SCANNER_MAJOR,
        };

        Ok(Self {
            major,
            download_url: format!(
                "{}/{}",
                options.scanner_base_url.trim_end_matches('/'),
                script_name(major)
            ),
        })
    }
}

/// `detect.sh` up to 6, `detect<major>.sh` afterwards
pub fn script_name(major: u32) -> String {
    if major <= 6 {
        SCANNER_SCRIPT.to_string()
    } else {
        format!("detect{}.sh", major)
    }
}

fn parse_major(version: &str) -> Option<u32> {
    let version = version.trim();
    let version = version.strip_prefix(['v', 'V']).unwrap_or(version);
    version.split('.').next()?.parse().ok()
}
