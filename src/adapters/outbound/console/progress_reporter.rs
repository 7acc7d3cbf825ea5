use crate::ports::outbound::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::cell::RefCell;
use std::io::IsTerminal;
use std::time::Duration;

/// Replacement text for registered secrets
const MASK: &str = "****";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with stdout output.
/// Uses indicatif for the progress bar and the scanner spinner. Registered
/// secrets are replaced with `****` in every message.
pub struct StderrProgressReporter {
    progress_bar: RefCell<Option<ProgressBar>>,
    secrets: RefCell<Vec<String>>,
    colored: bool,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: RefCell::new(None),
            secrets: RefCell::new(Vec::new()),
            colored: std::io::stderr().is_terminal(),
        }
    }

    /// Replaces every registered secret in `message`
    pub fn mask(&self, message: &str) -> String {
        self.secrets
            .borrow()
            .iter()
            .fold(message.to_string(), |masked, secret| {
                masked.replace(secret.as_str(), MASK)
            })
    }

    fn get_or_create_progress_bar(&self, total: usize) -> ProgressBar {
        let mut pb_option = self.progress_bar.borrow_mut();
        if let Some(pb) = pb_option.as_ref().filter(|pb| !pb.is_finished()) {
            pb.set_length(total as u64);
            return pb.clone();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        *pb_option = Some(pb.clone());
        pb
    }

    /// Clears whichever indicator is currently drawn
    fn finish_indicator(&self) {
        if let Some(pb) = self.progress_bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        self.finish_indicator();
        eprintln!("{}", self.mask(message));
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let pb = self.get_or_create_progress_bar(total);
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(self.mask(msg));
        }
        if current >= total {
            self.finish_indicator();
        }
    }

    fn report_error(&self, message: &str) {
        self.finish_indicator();
        let message = self.mask(message);
        if self.colored {
            eprintln!("{}", message.yellow());
        } else {
            eprintln!("{}", message);
        }
    }

    fn report_completion(&self, message: &str) {
        self.finish_indicator();
        let message = self.mask(message);
        eprintln!();
        if self.colored {
            eprintln!("{}", message.green());
        } else {
            eprintln!("{}", message);
        }
    }

    fn start_spinner(&self, message: &str) {
        self.finish_indicator();
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("   {spinner:.green} {msg} [{elapsed}]") {
            spinner.set_style(style);
        }
        spinner.set_message(self.mask(message));
        spinner.enable_steady_tick(Duration::from_millis(120));
        *self.progress_bar.borrow_mut() = Some(spinner);
    }

    fn register_secret(&self, secret: &str) {
        if secret.is_empty() {
            return;
        }
        let mut secrets = self.secrets.borrow_mut();
        if !secrets.iter().any(|s| s == secret) {
            secrets.push(secret.to_string());
            // Longest first so a secret containing another is masked whole
            secrets.sort_by_key(|s| std::cmp::Reverse(s.len()));
        }
    }
}
