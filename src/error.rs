//! Error types for the Hearth occurrence engine.

use thiserror::Error;

/// Main error type for Hearth operations.
#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Storage-related errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Horizon version conflict for tenant {tenant}: expected {expected}, found {found}")]
    VersionConflict {
        tenant: String,
        expected: u64,
        found: u64,
    },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors raised before anything is persisted.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Burial date only applies to death events")]
    BurialWithoutDeath,

    #[error("Burial date {burial} precedes death date {death}")]
    BurialBeforeDeath {
        burial: chrono::NaiveDate,
        death: chrono::NaiveDate,
    },
}

/// Result type alias for Hearth operations.
pub type Result<T> = std::result::Result<T, HearthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HearthError::Validation(ValidationError::MissingField("name".to_string()));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HearthError = io_err.into();
        assert!(matches!(err, HearthError::Io(_)));
    }

    #[test]
    fn test_version_conflict_display() {
        let err = StorageError::VersionConflict {
            tenant: "cohen".to_string(),
            expected: 3,
            found: 4,
        };
        assert!(err.to_string().contains("cohen"));
        assert!(err.to_string().contains('3'));
    }
}
