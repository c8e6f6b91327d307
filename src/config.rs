//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::query::ParserOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Expression parser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub strict_levels: bool,

    #[serde(default)]
    pub max_expression_length: Option<usize>,

    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

fn default_page_size() -> u64 {
    100
}

fn default_max_page_size() -> u64 {
    10_000
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict_levels: false,
            max_expression_length: None,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl ParserConfig {
    /// Options handed to the expression parsers
    pub fn options(&self) -> ParserOptions {
        ParserOptions {
            strict_levels: self.strict_levels,
            max_expression_length: self.max_expression_length,
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

/// Cube model location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("cube-expr").join("config.toml")),
            Some(PathBuf::from("/etc/cube-expr/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first candidate file that exists and parses, falling back to
    /// the environment. Files that fail to load are skipped with a warning.
    pub fn load_first(config_paths: &[PathBuf]) -> Self {
        for path in config_paths {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("CUBE_EXPR_MODEL") {
            self.model.path = Some(path);
        }

        if let Some(strict) = var("CUBE_EXPR_STRICT_LEVELS") {
            match strict.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.parser.strict_levels = true,
                "0" | "false" | "no" => self.parser.strict_levels = false,
                other => tracing::warn!("Ignoring CUBE_EXPR_STRICT_LEVELS={}", other),
            }
        }
        if let Some(size) = var("CUBE_EXPR_MAX_PAGE_SIZE") {
            if let Ok(size) = size.parse() {
                self.parser.max_page_size = size;
            }
        }

        if let Some(level) = var("CUBE_EXPR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CUBE_EXPR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# cube-expr Configuration
#
# Environment variables override these settings:
# - CUBE_EXPR_MODEL
# - CUBE_EXPR_STRICT_LEVELS
# - CUBE_EXPR_MAX_PAGE_SIZE
# - CUBE_EXPR_LOG_LEVEL
# - CUBE_EXPR_LOG_FORMAT

[parser]
# Reject drilldown levels the cube model does not list
strict_levels = false

# Reject expressions longer than this many bytes (unset = no limit)
# max_expression_length = 4096

# Rows per page when no pagesize is requested
default_page_size = 100

# Requested page sizes are clamped to this value
max_page_size = 10000

[model]
# Cube model file (.json or .toml)
# path = "./model.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.parser.strict_levels);
        assert_eq!(config.parser.max_page_size, 10_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.parser.options(), ParserOptions::default());
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.parser.default_page_size, 100);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.model.path.is_none());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[parser]\nstrict_levels = true\nmax_expression_length = 512\n[model]\npath = \"cube.json\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert!(config.parser.strict_levels);
        assert_eq!(config.parser.options().max_expression_length, Some(512));
        assert_eq!(config.model.path.as_deref(), Some("cube.json"));
        assert_eq!(config.parser.max_page_size, 10_000);
    }

    #[test]
    fn test_load_first_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[parser\n").unwrap();
        std::fs::write(&good, "[model]\npath = \"cube.json\"\n").unwrap();

        let config = Config::load_first(&[dir.path().join("absent.toml"), broken, good]);
        assert_eq!(config.model.path.as_deref(), Some("cube.json"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));

        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[parser\n").unwrap();
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CUBE_EXPR_MODEL", "/srv/cube.toml"),
            ("CUBE_EXPR_STRICT_LEVELS", "yes"),
            ("CUBE_EXPR_MAX_PAGE_SIZE", "250"),
            ("CUBE_EXPR_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.path.as_deref(), Some("/srv/cube.toml"));
        assert!(config.parser.strict_levels);
        assert_eq!(config.parser.max_page_size, 250);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
