use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::validation::phone::DEFAULT_VIRTUAL_PREFIXES;
use crate::validation::{Locale, PasswordPolicy};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Locale used when a request does not ask for one
    #[serde(default)]
    pub locale: Locale,
    #[serde(default = "default_virtual_prefixes")]
    pub virtual_prefixes: Vec<String>,
    #[serde(default)]
    pub password: PasswordPolicy,
}

fn default_virtual_prefixes() -> Vec<String> {
    DEFAULT_VIRTUAL_PREFIXES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            virtual_prefixes: default_virtual_prefixes(),
            password: PasswordPolicy::default(),
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.password.min_length == 0 {
            return Err(AppError::Configuration(
                "validation.password.min_length must be at least 1".to_string(),
            ));
        }

        if self.password.require_special && self.password.special_characters.is_empty() {
            return Err(AppError::Configuration(
                "validation.password.special_characters must not be empty when require_special is set"
                    .to_string(),
            ));
        }

        for prefix in &self.virtual_prefixes {
            if prefix.len() != 3 || !prefix.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::Configuration(format!(
                    "Invalid virtual prefix '{}': expected three digits",
                    prefix
                )));
            }
        }

        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> AppResult<Self> {
        let path = config_path.as_ref();

        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::from_yaml(&content).map_err(|e| match e {
            AppError::Configuration(msg) => {
                AppError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parse configuration from YAML text after expanding environment variables
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        let expanded = Self::expand_env_vars(content)?;

        let app_config: AppConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| AppError::Configuration(format!("Invalid YAML: {}", e)))?;

        app_config.validation.validate()?;

        Ok(app_config)
    }

    /// Listen on localhost with the built-in rule set
    pub fn default_config() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            validation: ValidationConfig::default(),
        }
    }

    /// Replaces `${VAR}` and `${VAR:-default}`. An unterminated `${` is kept as text.
    fn expand_env_vars(content: &str) -> AppResult<String> {
        let mut expanded = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(open) = rest.find("${") {
            let Some(len) = rest[open + 2..].find('}') else {
                break;
            };
            let expr = &rest[open + 2..open + 2 + len];
            let (name, default) = match expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (expr, None),
            };

            let value = match (std::env::var(name), default) {
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.to_string(),
                (Err(_), None) => {
                    return Err(AppError::Configuration(format!(
                        "Environment variable {} is not set and has no default",
                        name
                    )))
                }
            };

            expanded.push_str(&rest[..open]);
            expanded.push_str(&value);
            rest = &rest[open + 2 + len + 1..];
        }

        expanded.push_str(rest);
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("FV_TEST_PORT", "8080");

        let expanded = AppConfig::expand_env_vars("port: ${FV_TEST_PORT:-3000}").unwrap();
        assert_eq!(expanded, "port: 8080");

        let expanded_default =
            AppConfig::expand_env_vars("host: \"${FV_MISSING_VAR:-localhost}\"").unwrap();
        assert_eq!(expanded_default, "host: \"localhost\"");

        assert!(matches!(
            AppConfig::expand_env_vars("host: ${FV_MISSING_VAR}"),
            Err(AppError::Configuration(_))
        ));
        assert_eq!(
            AppConfig::expand_env_vars("prefix: 1${FV_MISSING_VAR").unwrap(),
            "prefix: 1${FV_MISSING_VAR"
        );

        std::env::remove_var("FV_TEST_PORT");
    }

    #[test]
    fn test_config_file_loading() {
        let config_content = r#"
server:
  host: "0.0.0.0"
  port: ${FV_CONFIG_PORT:-9000}

validation:
  locale: "zh-CN"
  virtual_prefixes: ["170", "171"]
  password:
    min_length: 10
    require_special: false
"#;

        let temp_file = std::env::temp_dir().join("form_validator_test_config.yaml");
        std::fs::write(&temp_file, config_content).unwrap();

        let config = AppConfig::load_from_file(&temp_file).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.validation.locale, Locale::ZhCn);
        assert_eq!(config.validation.virtual_prefixes, vec!["170", "171"]);
        assert_eq!(config.validation.password.min_length, 10);
        assert!(config.validation.password.require_uppercase);
        assert!(!config.validation.password.require_special);

        std::fs::remove_file(temp_file).unwrap();
    }

    #[test]
    fn test_validation_section_defaults() {
        let config = AppConfig::from_yaml("server:\n  host: \"127.0.0.1\"\n  port: 3000\n").unwrap();
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(config.validation.virtual_prefixes.len(), 6);
    }

    #[test]
    fn test_rejects_invalid_rules() {
        let zero_length = "server: {host: \"127.0.0.1\", port: 3000}\nvalidation:\n  password:\n    min_length: 0\n";
        assert!(AppConfig::from_yaml(zero_length).is_err());

        let bad_prefix = "server: {host: \"127.0.0.1\", port: 3000}\nvalidation:\n  virtual_prefixes: [\"17\"]\n";
        let err = AppConfig::from_yaml(bad_prefix).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("expected three digits"));

        let empty_specials = "server: {host: \"127.0.0.1\", port: 3000}\nvalidation:\n  password:\n    special_characters: \"\"\n";
        assert!(AppConfig::from_yaml(empty_specials).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let result = AppConfig::load_from_file("/nonexistent/path/config.yaml");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Configuration file not found"));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default_config();
        assert_eq!(config.server.port, 3000);
        assert!(config.validation.validate().is_ok());
    }
}
