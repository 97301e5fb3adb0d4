use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("color '{0}' must start with '#'")]
    MissingHash(String),
    #[error("color '{0}' must have 3, 6 or 8 hex digits")]
    BadLength(String),
    #[error("color '{0}' contains a non-hex digit")]
    BadDigit(String),
}

/// Why a detector reading was not added to the frequency buffer.
#[derive(Debug, Error, PartialEq)]
pub enum IngestError {
    #[error("frequency {0} Hz is not a positive finite value")]
    InvalidFrequency(f64),
    #[error("clarity {clarity:.3} is below the threshold {threshold:.3}")]
    BelowClarityThreshold { clarity: f64, threshold: f64 },
    #[error("display has been disposed")]
    Disposed,
}

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse font: {0}")]
    Parse(&'static str),
    #[error("failed to download font from {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no usable font found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: invalid melody: {source}")]
    Melody {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path}:{line}: invalid event: {source}")]
    Event {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid color for {field}: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorError,
    },
}
