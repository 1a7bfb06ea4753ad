use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Provider variables accepted under their conventional names.
const PROVIDER_ENV_KEYS: &[(&str, &str)] = &[
    ("GOOGLE_API_KEY", "search.api_key"),
    ("GOOGLE_SEARCH_ENGINE_ID", "search.engine_id"),
    ("OPENAI_API_KEY", "llm.api_key"),
    ("TWITTER_API_KEY", "publisher.api_key"),
    ("TWITTER_API_SECRET", "publisher.api_secret"),
    ("TWITTER_ACCESS_TOKEN", "publisher.access_token"),
    ("TWITTER_ACCESS_SECRET", "publisher.access_secret"),
];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Load configuration from environment variables only.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed("POSTWRIGHT_").split("__"))
        .merge(provider_env())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn provider_env() -> Env {
    let names: Vec<&str> = PROVIDER_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw()
        .only(&names)
        .map(|key| provider_env_target(key.as_str()).into())
}

fn provider_env_target(name: &str) -> &'static str {
    PROVIDER_ENV_KEYS
        .iter()
        .find(|(env_name, _)| env_name.eq_ignore_ascii_case(name))
        .map(|(_, target)| *target)
        .unwrap_or("ignored")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[server]
port = 9000

[search]
api_key = "google-key"
engine_id = "engine"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.search.api_key, "google-key");
        assert_eq!(config.search.image_page_size, 7);
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.images.refresh_limit, 3);
        assert!(config.search.api_key.is_empty());
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[server]
port = "not a port"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[server]
host = "127.0.0.1"
port = 3000

[images]
refresh_limit = 5
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.images.refresh_limit, 5);
    }

    #[test]
    fn test_provider_env_target() {
        assert_eq!(provider_env_target("GOOGLE_API_KEY"), "search.api_key");
        assert_eq!(provider_env_target("twitter_access_secret"), "publisher.access_secret");
        assert_eq!(provider_env_target("SOMETHING_ELSE"), "ignored");
    }
}
