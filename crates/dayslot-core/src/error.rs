//! Core error types for dayslot-core.
//!
//! Entities are validated when they are constructed, so the scheduling
//! pipeline itself never fails. Everything that can go wrong lives at the
//! edges: parsing, configuration and the in-memory stores.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for dayslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity missing from a store
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by boundary layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Config,
    Io,
}

impl CoreError {
    /// Classify this error for the caller's response mapper.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::Json(_) => ErrorKind::Validation,
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Config(_) => ErrorKind::Config,
            CoreError::Io(_) => ErrorKind::Io,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Validation errors raised while constructing entities or parsing input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be later than start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// All-day range whose end date is not after its start date
    #[error("Invalid date range: end_date ({end}) must be later than start_date ({start})")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Duration not positive or not on the expected grid
    #[error("Invalid value for '{field}': {value} ({message})")]
    InvalidDuration {
        field: &'static str,
        value: i64,
        message: &'static str,
    },

    /// Priority other than A or B
    #[error("Invalid priority '{0}': expected \"A\" or \"B\"")]
    InvalidPriority(String),

    /// Unparseable ISO-8601 instant
    #[error("Invalid datetime '{value}': {message}")]
    InvalidInstant { value: String, message: String },

    /// Unparseable calendar date
    #[error("Invalid date '{0}': expected YYYY-MM-DD or an ISO-8601 datetime")]
    InvalidDate(String),

    /// Naive local time skipped by a DST transition
    #[error("Local time {0} does not exist in the configured timezone")]
    NonexistentLocalTime(chrono::NaiveDateTime),

    /// Algorithm selector other than greedy/compact
    #[error("Unsupported algorithm '{0}': expected \"greedy\" or \"compact\"")]
    UnsupportedAlgorithm(String),

    /// Unknown timezone name or malformed offset
    #[error("Invalid timezone '{0}'")]
    InvalidTimezone(String),

    /// Required field missing or empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Two records of the same kind share an id
    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    /// Failure inside one record of a batch
    #[error("{kind} #{index}: {source}")]
    InRecord {
        kind: &'static str,
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_maps_validation_and_lookup_errors() {
        let err = CoreError::from(ValidationError::InvalidPriority("C".into()));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = CoreError::NotFound { kind: "task", id: "t1".into() };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "task 't1' not found");
    }

    #[test]
    fn duration_error_names_the_field() {
        let err = ValidationError::InvalidDuration {
            field: "duration_min",
            value: 25,
            message: "must be a positive multiple of 10",
        };
        assert!(err.to_string().contains("duration_min"));
        assert!(err.to_string().contains("25"));
    }
}
