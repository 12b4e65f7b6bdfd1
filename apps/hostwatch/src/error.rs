use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the persisted target list
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read target list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("failed to write target list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("failed to write config {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("failed to parse config {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config directory available (set XDG_CONFIG_HOME or HOME)")]
    ConfigPathUnavailable,
    #[error("invalid config: {0}")]
    Invalid(String),
}
