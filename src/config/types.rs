use serde::Deserialize;

/// Main configuration structure for leaguemine
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub targets: TargetsConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent extraction workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Wait for the profile container after navigation (seconds)
    #[serde(rename = "container-timeout-secs", default = "default_long_timeout")]
    pub container_timeout_secs: u64,

    /// Wait for clickable controls (seconds)
    #[serde(rename = "control-timeout-secs", default = "default_short_timeout")]
    pub control_timeout_secs: u64,

    /// Fixed settle after opening the league dropdown (milliseconds)
    #[serde(rename = "dropdown-settle-millis", default = "default_dropdown_settle")]
    pub dropdown_settle_millis: u64,

    /// Fixed settle for manager-mode data to populate (seconds)
    #[serde(rename = "mode-settle-secs", default = "default_mode_settle")]
    pub mode_settle_secs: u64,

    /// Wait for the record summary element (seconds)
    #[serde(rename = "record-timeout-secs", default = "default_long_timeout")]
    pub record_timeout_secs: u64,

    /// Wait for the owner name element (seconds)
    #[serde(rename = "name-timeout-secs", default = "default_short_timeout")]
    pub name_timeout_secs: u64,
}

/// Automation session pool configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// WebDriver endpoint the pool opens sessions against
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Maximum number of concurrently leased sessions
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: u32,

    /// Uses after which a session is torn down and replaced
    #[serde(rename = "usage-quota", default = "default_usage_quota")]
    pub usage_quota: u32,

    /// How long a worker waits for a free session (seconds)
    #[serde(rename = "lease-timeout-secs", default = "default_lease_timeout")]
    pub lease_timeout_secs: u64,
}

/// Target list configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TargetsConfig {
    /// Path to the URL list file
    #[serde(rename = "list-path")]
    pub list_path: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the persisted snapshot (next run's comparison baseline)
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,

    /// Path to the display snapshot consumed by the renderer
    #[serde(rename = "display-path")]
    pub display_path: String,
}

fn default_concurrency() -> u32 {
    5
}

fn default_long_timeout() -> u64 {
    10
}

fn default_short_timeout() -> u64 {
    5
}

fn default_dropdown_settle() -> u64 {
    1000
}

fn default_mode_settle() -> u64 {
    10
}

fn default_webdriver_url() -> String {
    "http://localhost:9515".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_usage_quota() -> u32 {
    5
}

fn default_lease_timeout() -> u64 {
    30
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            container_timeout_secs: default_long_timeout(),
            control_timeout_secs: default_short_timeout(),
            dropdown_settle_millis: default_dropdown_settle(),
            mode_settle_secs: default_mode_settle(),
            record_timeout_secs: default_long_timeout(),
            name_timeout_secs: default_short_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            pool_size: default_pool_size(),
            usage_quota: default_usage_quota(),
            lease_timeout_secs: default_lease_timeout(),
        }
    }
}
