use dotenv::dotenv;
use std::env;

/// Configuration for the event log source
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Path to the decoded event log (NDJSON, one event per line)
    pub event_log_path: String,
    /// Block height ingestion starts from; earlier events are skipped
    pub start_block: u64,
}

/// Configuration for the off-chain metadata fetcher
#[derive(Debug, Clone)]
pub struct MetadataConfig {
    /// Whether the async metadata worker is started at all
    pub enabled: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Event ingestion configuration
    pub ingest: IngestConfig,
    /// Metadata fetcher configuration
    pub metadata: MetadataConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        // Ensure .env file is loaded
        dotenv().ok();

        let ingest = IngestConfig {
            event_log_path: env::var("EVENT_LOG_PATH").unwrap_or_else(|_| "events.ndjson".to_string()),
            start_block: env::var("START_BLOCK")
                .unwrap_or_else(|_| "0".to_string())
                .parse::<u64>()
                .unwrap_or(0),
        };

        let metadata = MetadataConfig {
            enabled: env::var("METADATA_FETCH_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            timeout_secs: env::var("METADATA_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u64>()
                .unwrap_or(10),
            connect_timeout_secs: env::var("METADATA_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u64>()
                .unwrap_or(5),
        };

        Self { ingest, metadata }
    }
}
