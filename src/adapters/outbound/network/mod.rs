/// Network adapters for external API calls
mod blackduck_client;

pub use blackduck_client::BlackDuckClient;
