use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Image page size is within what the search API serves (1..=10)
/// - Image refresh limit is at least 1
///
/// Credentials are not checked here; each provider fails fast when used.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if !(1..=10).contains(&config.search.image_page_size) {
        return Err(ConfigError::ValidationError(format!(
            "search.image_page_size must be between 1 and 10, got {}",
            config.search.image_page_size
        )));
    }

    if config.images.refresh_limit == 0 {
        return Err(ConfigError::ValidationError(
            "images.refresh_limit must be at least 1".to_string(),
        ));
    }

    Ok(())
}
