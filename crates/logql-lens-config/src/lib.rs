use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid saved query pattern {pattern}: {source}")]
    GlobPatternError {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Failed to list saved queries: {source}")]
    GlobReadError { source: glob::GlobError },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown output format `{0}`, expected `text` or `json`")]
pub struct ParseOutputFormatError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ParseOutputFormatError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Label that names the service in stream selectors
    pub service_label: String,
    pub output: OutputFormat,
    /// Glob patterns of files holding one query per line
    pub saved_queries: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_label: "service_name".to_string(),
            output: OutputFormat::default(),
            saved_queries: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/logql-lens");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Files matched by the saved query patterns, after shell expansion.
    ///
    /// Patterns are expanded in order; matches of one pattern come sorted.
    pub fn query_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for pattern in &self.saved_queries {
            let expanded = Self::expand_path(Path::new(pattern))
                .unwrap_or_else(|| PathBuf::from(pattern));
            let expanded = expanded.to_string_lossy();

            let paths = glob::glob(&expanded).map_err(|source| ConfigError::GlobPatternError {
                pattern: pattern.clone(),
                source,
            })?;
            for path in paths {
                files.push(path.map_err(|source| ConfigError::GlobReadError { source })?);
            }
        }
        Ok(files)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
