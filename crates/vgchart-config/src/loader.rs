//! Configuration loading utilities

use crate::Config;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};
use vgchart_common::Result as VgResult;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "VGCHART_CONFIG_PATH";

/// File names probed in the working directory when no path is given
pub const DEFAULT_CONFIG_FILES: [&str; 2] = ["vgchart.yaml", "vgchart.yml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),
}

impl From<ConfigError> for vgchart_common::VgError {
    fn from(err: ConfigError) -> Self {
        vgchart_common::VgError::config_with_source("Failed to load configuration", err)
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading configuration file");

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        info!(path = %path.display(), pages = config.pages.len(), "Configuration loaded");
        Ok(config)
    }

    /// Find the configuration: the file named by `VGCHART_CONFIG_PATH`, a
    /// file in the working directory, or the built-in defaults.
    ///
    /// A `VGCHART_CONFIG_PATH` naming a missing file is an error rather than
    /// a silent fall back to defaults.
    pub fn discover() -> Result<ConfigSource, ConfigError> {
        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(config_path);
            if !path.is_file() {
                return Err(ConfigError::MissingConfig(format!(
                    "{CONFIG_PATH_ENV} points to {}, which does not exist",
                    path.display()
                )));
            }
            return Ok(ConfigSource::File(path));
        }

        for candidate in DEFAULT_CONFIG_FILES {
            if Path::new(candidate).exists() {
                return Ok(ConfigSource::File(PathBuf::from(candidate)));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(ConfigSource::Defaults)
    }

    /// Load the configuration described by `source`
    pub fn load_source(source: &ConfigSource) -> VgResult<Config> {
        match source {
            ConfigSource::File(path) => Ok(Self::load_config(path)?),
            ConfigSource::Defaults => Ok(Self::load_defaults()?),
        }
    }

    /// Discover and load the configuration, reporting where it came from
    pub fn load() -> VgResult<(Config, ConfigSource)> {
        let source = Self::discover()?;
        let config = Self::load_source(&source)?;
        Ok((config, source))
    }

    /// Built-in defaults with environment overrides applied
    pub fn load_defaults() -> Result<Config, ConfigError> {
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(path) = env::var("VGCHART_DATA_PATH") {
            config.data.path = path;
        }

        if let Ok(dir) = env::var("VGCHART_OUTPUT_DIR") {
            config.output.dir = dir;
        }

        if let Some(snapshots) = parse_env::<bool>("VGCHART_SNAPSHOTS")? {
            config.output.snapshots = snapshots;
        }

        // Size overrides apply to every page
        if let Some(width) = parse_env::<u32>("VGCHART_CHART_WIDTH")? {
            for page in &mut config.pages {
                page.layout.width = width;
            }
        }

        if let Some(height) = parse_env::<u32>("VGCHART_CHART_HEIGHT")? {
            for page in &mut config.pages {
                page.layout.height = height;
            }
        }

        if let Ok(color) = env::var("VGCHART_BAR_COLOR") {
            config.style.bar_color = color;
        }

        if let Ok(color) = env::var("VGCHART_HOVER_COLOR") {
            config.style.hover_color = color;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("LOG_FILE") {
            config.logging.file = Some(file);
        }

        if let Some(json) = parse_env::<bool>("LOG_JSON")? {
            config.logging.json = json;
        }

        Ok(())
    }
}

fn parse_env<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::EnvParseError {
                var: var.to_string(),
                source: Box::new(e),
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Process environment is shared between test threads
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: [&str; 11] = [
        "VGCHART_CONFIG_PATH",
        "VGCHART_DATA_PATH",
        "VGCHART_OUTPUT_DIR",
        "VGCHART_SNAPSHOTS",
        "VGCHART_CHART_WIDTH",
        "VGCHART_CHART_HEIGHT",
        "VGCHART_BAR_COLOR",
        "VGCHART_HOVER_COLOR",
        "LOG_LEVEL",
        "LOG_FILE",
        "LOG_JSON",
    ];

    fn clear_env() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    fn create_test_config_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_load_valid_yaml_config() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let yaml = r##"
data:
  path: "data/vgsales.csv"
output:
  dir: "public"
  snapshots: true
style:
  bar_color: "#336699"
pages:
  - name: by_publisher
    file: by_publisher.html
    title: "Publishers"
    group_by: publisher
    order: descending_sum
    top_n: 5
"##;

        let temp_file = create_test_config_file(yaml);
        let config = ConfigLoader::load_config(temp_file.path()).expect("Failed to load config");

        assert_eq!(config.data.path, "data/vgsales.csv");
        assert_eq!(config.output.dir, "public");
        assert!(config.output.snapshots);
        assert_eq!(config.style.bar_color, "#336699");
        assert_eq!(config.pages.len(), 1);
        assert_eq!(config.pages[0].top_n, Some(5));
        assert_eq!(config.pages[0].order, crate::BucketOrder::DescendingSum);
    }

    #[test]
    fn test_invalid_yaml() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("pages: [unclosed");
        let result = ConfigLoader::load_config(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("pages:\n  - name: x\n    file: x.html\n    group_by: genre\n");
        let result = ConfigLoader::load_config(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validation_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("style:\n  font_size: 2\n");
        let result = ConfigLoader::load_config(temp_file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_environment_variable_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("VGCHART_DATA_PATH", "/tmp/sales.csv");
        env::set_var("VGCHART_OUTPUT_DIR", "/tmp/site");
        env::set_var("VGCHART_SNAPSHOTS", "true");
        env::set_var("VGCHART_CHART_WIDTH", "1024");
        env::set_var("VGCHART_HOVER_COLOR", "orange");
        env::set_var("LOG_LEVEL", "debug");

        let temp_file = create_test_config_file("data:\n  path: original.csv\n");
        let config = ConfigLoader::load_config(temp_file.path()).expect("Failed to load config");

        assert_eq!(config.data.path, "/tmp/sales.csv");
        assert_eq!(config.output.dir, "/tmp/site");
        assert!(config.output.snapshots);
        assert!(config.pages.iter().all(|p| p.layout.width == 1024));
        assert_eq!(config.style.hover_color, "orange");
        assert_eq!(config.logging.level, "debug");

        clear_env();
    }

    #[test]
    fn test_env_parse_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var("VGCHART_CHART_WIDTH", "wide");
        let temp_file = create_test_config_file("data:\n  path: vgsales.csv\n");
        let result = ConfigLoader::load_config(temp_file.path());

        match result.unwrap_err() {
            ConfigError::EnvParseError { var, .. } => assert_eq!(var, "VGCHART_CHART_WIDTH"),
            other => panic!("unexpected error: {other}"),
        }

        clear_env();
    }

    #[test]
    fn test_missing_config_file() {
        let result = ConfigLoader::load_config("/nonexistent/path/vgchart.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_explicit_path_from_environment() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("output:\n  dir: from_env\n");
        env::set_var(CONFIG_PATH_ENV, temp_file.path());

        let (config, source) = ConfigLoader::load().expect("Failed to load config");
        assert_eq!(config.output.dir, "from_env");
        assert_eq!(source, ConfigSource::File(temp_file.path().to_path_buf()));

        clear_env();
    }

    #[test]
    fn test_config_path_env_to_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        env::set_var(CONFIG_PATH_ENV, "/nonexistent/vgchart.yaml");
        let err = ConfigLoader::discover().unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig(_)));
        assert!(err.to_string().contains("/nonexistent/vgchart.yaml"));
        assert!(ConfigLoader::load().is_err());

        clear_env();
    }

    #[test]
    fn test_discover_reports_file_source() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let temp_file = create_test_config_file("output:\n  dir: from_env\n");
        env::set_var(CONFIG_PATH_ENV, temp_file.path());
        let source = ConfigLoader::discover().unwrap();
        assert_eq!(source, ConfigSource::File(temp_file.path().to_path_buf()));
        assert_eq!(source.to_string(), temp_file.path().display().to_string());
        assert_eq!(ConfigSource::Defaults.to_string(), "built-in defaults");

        clear_env();
    }

    #[test]
    fn test_load_defaults_with_fallback() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = ConfigLoader::load_defaults().expect("Failed to load default config");
        assert_eq!(config.data.path, "vgsales.csv");
        assert_eq!(config.pages.len(), 4);
    }

    #[test]
    fn test_config_error_converts_to_vg_error() {
        let err: vgchart_common::VgError = ConfigError::MissingConfig("vgchart.yaml".to_string()).into();
        assert!(matches!(err, vgchart_common::VgError::Config { .. }));
    }
}
