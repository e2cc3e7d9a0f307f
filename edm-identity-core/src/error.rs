//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Generic lookup miss (sender identity by id, domain by id on `get`/`delete`)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Domain name failed hostname validation
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    /// Sender prefix failed local-part validation
    #[error("Invalid sender prefix: {0}")]
    InvalidPrefix(String),

    /// Sender address already registered (across all domains)
    #[error("Email address already exists: {0}")]
    DuplicateEmailAddress(String),

    /// Sender registration against a domain that is not verified
    #[error("Domain is not verified: {0}")]
    DomainNotVerified(String),

    /// Domain referenced by a sender operation does not exist
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// Verification requested for a domain that is already verified
    #[error("Domain already verified: {0}")]
    AlreadyVerified(String),

    /// Unknown record type, or a record set lacking an entry for it
    #[error("Invalid record type: {0}")]
    InvalidRecordType(String),

    /// Domain name registered twice
    #[error("Domain already exists: {0}")]
    DomainAlreadyExists(String),

    /// Generic validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// DNS verification checker failed
    #[error("Verification checker error: {0}")]
    CheckerError(String),

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl CoreError {
    /// Whether the error is caused by caller input or entity state rather than
    /// infrastructure. Used to pick the log level.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Update this method when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::NotFound(_)
            | Self::InvalidDomainName(_)
            | Self::InvalidPrefix(_)
            | Self::DuplicateEmailAddress(_)
            | Self::DomainNotVerified(_)
            | Self::DomainNotFound(_)
            | Self::AlreadyVerified(_)
            | Self::InvalidRecordType(_)
            | Self::DomainAlreadyExists(_)
            | Self::ValidationError(_) => true,
            Self::CheckerError(_)
            | Self::ConfigError(_)
            | Self::SerializationError(_)
            | Self::StorageError(_) => false,
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::SerializationError(e.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_are_expected() {
        assert!(CoreError::DomainNotVerified("d1".to_string()).is_expected());
        assert!(CoreError::DuplicateEmailAddress("a@b.com".to_string()).is_expected());
        assert!(CoreError::AlreadyVerified("d1".to_string()).is_expected());
    }

    #[test]
    fn infrastructure_errors_are_not_expected() {
        assert!(!CoreError::StorageError("disk full".to_string()).is_expected());
        assert!(!CoreError::CheckerError("timeout".to_string()).is_expected());
    }

    #[test]
    fn serializes_with_code_and_details() {
        let json = serde_json::to_value(CoreError::InvalidPrefix("-x".to_string())).unwrap();
        assert_eq!(json["code"], "InvalidPrefix");
        assert_eq!(json["details"], "-x");
    }
}
