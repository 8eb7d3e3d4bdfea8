//! Typed error definitions for Validator Watch.
//!
//! Errors here are serializable for structured reporting, and comparable so
//! tests can match exact variants.

mod config;

pub use config::ConfigError;

/// Standard Result type for configuration handling.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = ConfigError::ValidationError {
            field: "validator_address".to_string(),
            message: "must not be empty".to_string(),
        };

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("ValidationError"));
        assert!(json.contains("validator_address"));

        let deserialized: ConfigError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, deserialized);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::NotFound { path: "/etc/validator-watch.json".to_string() };

        let msg = format!("{}", err);
        assert!(msg.contains("/etc/validator-watch.json"));
    }
}
