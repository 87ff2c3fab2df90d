//! Loading backdrop configuration files
//!
//! The same [`BackdropConfig`] document the browser accepts as JSON can be
//! kept on disk as YAML or JSON. The format is picked from the extension.

use std::fs;
use std::path::Path;

use backdrop_fx::{BackdropConfig, ConfigError};
use thiserror::Error;

/// Errors that can occur while loading a configuration file
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file extension could not be determined
    #[error("could not determine config format from path: {0}")]
    UnknownExtension(String),

    /// The file format is not supported
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The document parsed but describes an unusable configuration
    #[error("invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

/// Result type for configuration loading
pub type LoadResult<T> = Result<T, LoadError>;

/// On-disk configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> LoadResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| LoadError::UnknownExtension(path.display().to_string()))?;

        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(LoadError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse a document in this format; absent fields take their defaults
    pub fn parse(self, content: &str) -> LoadResult<BackdropConfig> {
        let config: BackdropConfig = match self {
            Self::Yaml => {
                serde_yaml::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?
            }
            Self::Json => {
                serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))?
            }
        };
        config.validate()?;
        Ok(config)
    }
}

/// Read and validate a configuration file
pub fn load_config(path: &Path) -> LoadResult<BackdropConfig> {
    let format = ConfigFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    let config = format.parse(&content)?;
    tracing::debug!(path = %path.display(), ?format, "loaded config");
    Ok(config)
}

/// Load the file when given, defaults otherwise
pub fn load_or_default(path: Option<&Path>) -> LoadResult<BackdropConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(BackdropConfig::default()),
    }
}
