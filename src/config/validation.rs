use crate::config::types::{Config, CrawlerConfig, OutputConfig, SessionConfig, TargetsConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_session_config(&config.session)?;
    validate_targets_config(&config.targets)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl behavior configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 32, got {}",
            config.concurrency
        )));
    }

    if config.container_timeout_secs < 1 || config.record_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "element wait timeouts must be at least 1 second".to_string(),
        ));
    }

    if config.mode_settle_secs > 60 {
        return Err(ConfigError::Validation(format!(
            "mode-settle-secs must be <= 60, got {}",
            config.mode_settle_secs
        )));
    }

    Ok(())
}

/// Validates session pool configuration
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 16 {
        return Err(ConfigError::Validation(format!(
            "pool-size must be between 1 and 16, got {}",
            config.pool_size
        )));
    }

    if config.usage_quota < 1 {
        return Err(ConfigError::Validation(
            "usage-quota must be >= 1".to_string(),
        ));
    }

    if config.lease_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "lease-timeout-secs must be >= 1".to_string(),
        ));
    }

    let url = Url::parse(&config.webdriver_url)
        .map_err(|_| ConfigError::InvalidUrl(config.webdriver_url.clone()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(config.webdriver_url.clone()));
    }

    Ok(())
}

/// Validates target list configuration
fn validate_targets_config(config: &TargetsConfig) -> Result<(), ConfigError> {
    if config.list_path.is_empty() {
        return Err(ConfigError::Validation(
            "targets.list-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.snapshot_path.is_empty() || config.display_path.is_empty() {
        return Err(ConfigError::Validation(
            "output paths cannot be empty".to_string(),
        ));
    }

    if config.snapshot_path == config.display_path {
        return Err(ConfigError::Validation(
            "snapshot-path and display-path must differ".to_string(),
        ));
    }

    Ok(())
}
