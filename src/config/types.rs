use crate::crawler::TaskKind;
use serde::Deserialize;

/// Storefront entry page crawled when no seed is given
pub const DEFAULT_SEED_URL: &str = "https://www.nike.ae/en/home/";

/// Browser-like identification sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Main configuration structure for Catalog-Crawler
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// How a worker reacts when `pop` waits out the idle timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationPolicy {
    /// Keep waiting while other tasks are in flight; exit only once the
    /// queue is empty and no worker holds a task
    #[default]
    Drain,

    /// Exit on the first idle timeout
    Idle,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub workers: usize,

    /// How long a worker waits on an empty queue (milliseconds)
    #[serde(rename = "idle-timeout-ms")]
    pub idle_timeout_ms: u64,

    /// Worker exit condition
    pub termination: TerminationPolicy,

    /// First URL placed on the queue
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Task kind of the seed URL
    #[serde(rename = "seed-kind")]
    pub seed_kind: TaskKind,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 5,
            idle_timeout_ms: 5_000,
            termination: TerminationPolicy::Drain,
            seed_url: DEFAULT_SEED_URL.to_string(),
            seed_kind: TaskKind::Home,
        }
    }
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the timestamped CSV is written to
    pub directory: String,

    /// File name prefix, followed by `_<YYYYmmdd_HHMMSS>.csv`
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,

    /// Column delimiter
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            file_prefix: "output".to_string(),
            delimiter: ',',
        }
    }
}
