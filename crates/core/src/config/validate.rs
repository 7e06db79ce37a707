use super::{types::Config, ConfigError};

/// Validates a loaded configuration:
/// - both buckets are named
/// - the poll interval is shorter than the poll timeout
/// - the notifier endpoint, when present, is an http(s) URL
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.storage.workspace_bucket.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.workspace_bucket must be set".to_string(),
        ));
    }
    if config.storage.landing_bucket.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.landing_bucket must be set".to_string(),
        ));
    }

    if config.poller.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poller.interval_secs cannot be 0".to_string(),
        ));
    }
    if config.poller.interval_secs >= config.poller.timeout_secs {
        return Err(ConfigError::ValidationError(format!(
            "poller.interval_secs ({}) must be shorter than poller.timeout_secs ({})",
            config.poller.interval_secs, config.poller.timeout_secs
        )));
    }

    if let Some(notifier) = &config.notifier {
        if !notifier.endpoint.starts_with("http://") && !notifier.endpoint.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "notifier.endpoint '{}' is not an http(s) URL",
                notifier.endpoint
            )));
        }
    }

    Ok(())
}
