//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Failure to produce a usable configuration from a file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Carries every semantic problem found, not just the first.
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ClientConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/fts-client.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let path = std::env::temp_dir().join("fts_client_loader_malformed.toml");
        fs::write(&path, "endpoints = 3").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_display_aggregates_all_errors() {
        let err = ConfigError::Validation(vec![
            ValidationError::ZeroValue {
                field: "rate_limit.window_ms",
            },
            ValidationError::InvalidBindAddress {
                field: "payment.bind_address",
                value: "nowhere".to_string(),
            },
        ]);
        let rendered = err.to_string();
        assert!(rendered.starts_with("Validation failed: "));
        assert!(rendered.contains("rate_limit.window_ms"));
        assert!(rendered.contains("payment.bind_address"));
    }
}
