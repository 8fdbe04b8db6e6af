use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub fetcher: FetcherConfig,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
    pub sentiment: SentimentConfig,
}

/// EDGAR fetcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetcherConfig {
    /// Submissions index host.
    #[serde(default = "default_submissions_url")]
    pub submissions_url: String,

    /// Document archive host.
    #[serde(default = "default_archives_url")]
    pub archives_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// SEC allows at most 10 requests per second; stay well under it.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// SEC requires an identifying user agent with a contact address.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Batch pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Conviction score at or above which a row also lands in the
    /// high-conviction signals file.
    #[serde(default = "default_high_conviction_threshold")]
    pub high_conviction_threshold: f64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Sentiment correlation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentimentConfig {
    /// Trades within ± this many days of a transcript date are joined.
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_submissions_url() -> String {
    "https://data.sec.gov".to_string()
}
fn default_archives_url() -> String {
    "https://www.sec.gov".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_request_delay_ms() -> u64 {
    150
}
fn default_jitter_ms() -> u64 {
    100
}
fn default_max_retries() -> u32 {
    3
}
fn default_user_agent() -> String {
    "insider-etl/0.1 (research project; admin@example.com)".to_string()
}
fn default_input_dir() -> PathBuf {
    PathBuf::from("data/raw_xml")
}
fn default_high_conviction_threshold() -> f64 {
    4.0
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data/processed")
}
fn default_window_days() -> i64 {
    30
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("INSIDER").separator("__"))
            .build()?;

        let app_cfg: AppConfig = cfg.try_deserialize().unwrap_or_else(|_| AppConfig::default());
        Ok(app_cfg)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig {
                submissions_url: default_submissions_url(),
                archives_url: default_archives_url(),
                timeout_secs: default_timeout_secs(),
                request_delay_ms: default_request_delay_ms(),
                jitter_ms: default_jitter_ms(),
                max_retries: default_max_retries(),
                user_agent: default_user_agent(),
            },
            pipeline: PipelineConfig {
                input_dir: default_input_dir(),
                high_conviction_threshold: default_high_conviction_threshold(),
            },
            storage: StorageConfig {
                output_dir: default_output_dir(),
            },
            sentiment: SentimentConfig {
                window_days: default_window_days(),
            },
        }
    }
}
