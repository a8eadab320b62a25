//! Error types
//!
//! Conversion itself never fails on content: unknown tags, unmapped files and
//! malformed index records all degrade to plain output plus a diagnostic. What
//! remains are input that is not text at all and configuration that does not
//! parse.

use std::fmt;

/// Error that can occur when handing raw bytes to the converter
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Input is not valid UTF-8
    InvalidEncoding(std::str::Utf8Error),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::InvalidEncoding(err) => write!(f, "Invalid input encoding: {err}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::InvalidEncoding(err) => Some(err),
        }
    }
}

impl From<std::str::Utf8Error> for ConvertError {
    fn from(err: std::str::Utf8Error) -> Self {
        ConvertError::InvalidEncoding(err)
    }
}

/// Error that can occur while loading options or a URL map
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// JSON document did not deserialize
    Json(String),
    /// YAML document did not deserialize
    Yaml(String),
    /// A value parsed but is out of range
    InvalidOption(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "JSON error: {msg}"),
            ConfigError::Yaml(msg) => write!(f, "YAML error: {msg}"),
            ConfigError::InvalidOption(msg) => write!(f, "Invalid option: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err.to_string())
    }
}
