pub mod types;

use crate::error::ConfigError;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub use types::Config;

const CONFIG_FILE_NAME: &str = ".kubesage.toml";

/// Get the global config file path (~/.kubesage.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// The explicit path when given, the global path otherwise
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or_else(global_config_path)
}

/// Load configuration from file or use defaults
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = resolve_config_path(explicit) else {
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParsingFailed(e.to_string()))
}

/// Save configuration to the resolved config file
pub fn save_config(explicit: Option<&Path>, config: &Config) -> Result<PathBuf, ConfigError> {
    let path = resolve_config_path(explicit).ok_or_else(|| ConfigError::WriteFailed {
        path: format!("~/{}", CONFIG_FILE_NAME),
        source: io::Error::new(io::ErrorKind::NotFound, "home directory not found"),
    })?;
    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::ParsingFailed(e.to_string()))?;
    fs::write(&path, content).map_err(|source| ConfigError::WriteFailed {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::CacheKind;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
active_filters = ["Ingress", "Service"]

[[custom_analyzers]]
name = "trivy"
url = "localhost"
port = 8085

[ai]
backend = "anthropic"
language = "german"

[cache]
kind = "memory"
disabled = true

[analysis]
max_concurrency = 4
"#,
        )
        .unwrap();

        assert_eq!(config.active_filters, vec!["Ingress", "Service"]);
        assert_eq!(config.custom_analyzers[0].port, 8085);
        assert_eq!(config.ai.backend, "anthropic");
        assert_eq!(config.ai.language, "german");
        assert_eq!(config.cache.kind, CacheKind::Memory);
        assert!(config.cache.disabled);
        assert_eq!(config.analysis.max_concurrency, 4);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.max_concurrency, 10);
        assert_eq!(config.ai.language, "english");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(matches!(
            parse_config("active_filters = 3"),
            Err(ConfigError::ParsingFailed(_))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubesage.toml");
        assert_eq!(load_config(Some(&path)).unwrap(), Config::default());

        let mut config = Config::default();
        config.active_filters = vec!["Pod".to_string()];
        save_config(Some(&path), &config).unwrap();

        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_save_into_missing_directory_is_a_write_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("kubesage.toml");

        let err = save_config(Some(&path), &Config::default()).unwrap_err();
        assert!(matches!(err, ConfigError::WriteFailed { .. }));
        assert!(err.to_string().starts_with("Failed to write config file"));
    }
}
