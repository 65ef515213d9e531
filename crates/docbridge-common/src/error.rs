//! Error types for docbridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for all bridge operations
#[derive(Error, Debug, Clone)]
pub enum BridgeError {
    #[error("MongoDB error: {0}")]
    MongoDB(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// An id-keyed lookup was called with an empty identifier.
    #[error("document id is empty for entity '{entity}'")]
    EmptyDocumentId { entity: String },

    /// An identifier did not parse as the driver's native id type.
    #[error("invalid document id '{value}': {reason}")]
    InvalidDocumentId { value: String, reason: String },
}

impl BridgeError {
    /// Returns true if this error was raised by input screening, before any
    /// driver call was attempted
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BridgeError::Validation(_)
                | BridgeError::EmptyDocumentId { .. }
                | BridgeError::InvalidDocumentId { .. }
        )
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for BridgeError {
    fn from(err: mongodb::error::Error) -> Self {
        BridgeError::MongoDB(err.to_string())
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::ser::Error> for BridgeError {
    fn from(err: bson::ser::Error) -> Self {
        BridgeError::Serialization(format!("BSON serialization error: {}", err))
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::de::Error> for BridgeError {
    fn from(err: bson::de::Error) -> Self {
        BridgeError::Deserialization(format!("BSON deserialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_mongodb() {
        let err = BridgeError::MongoDB("connection refused".to_string());
        assert_eq!(err.to_string(), "MongoDB error: connection refused");
    }

    #[test]
    fn test_error_display_serialization() {
        let err = BridgeError::Serialization("invalid JSON".to_string());
        assert_eq!(err.to_string(), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_error_display_deserialization() {
        let err = BridgeError::Deserialization("missing field".to_string());
        assert_eq!(err.to_string(), "Deserialization error: missing field");
    }

    #[test]
    fn test_error_display_connection() {
        let err = BridgeError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection error: timeout");
    }

    #[test]
    fn test_error_display_query() {
        let err = BridgeError::Query("invalid operator".to_string());
        assert_eq!(err.to_string(), "Query error: invalid operator");
    }

    #[test]
    fn test_error_display_validation() {
        let err = BridgeError::Validation("field required".to_string());
        assert_eq!(err.to_string(), "Validation error: field required");
    }

    #[test]
    fn test_error_display_empty_document_id() {
        let err = BridgeError::EmptyDocumentId {
            entity: "users".to_string(),
        };
        assert_eq!(err.to_string(), "document id is empty for entity 'users'");
    }

    #[test]
    fn test_error_display_invalid_document_id() {
        let err = BridgeError::InvalidDocumentId {
            value: "zzz".to_string(),
            reason: "not hex".to_string(),
        };
        assert_eq!(err.to_string(), "invalid document id 'zzz': not hex");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: BridgeError = json_err.into();
        assert!(matches!(err, BridgeError::Serialization(_)));
    }

    #[test]
    fn test_is_input_error() {
        assert!(BridgeError::Validation("test".to_string()).is_input_error());
        assert!(BridgeError::EmptyDocumentId {
            entity: "users".to_string()
        }
        .is_input_error());
        assert!(BridgeError::InvalidDocumentId {
            value: "x".to_string(),
            reason: "short".to_string()
        }
        .is_input_error());
        assert!(!BridgeError::MongoDB("test".to_string()).is_input_error());
        assert!(!BridgeError::Connection("test".to_string()).is_input_error());
    }

    #[test]
    fn test_result_type_err() {
        let result: Result<i32> = Err(BridgeError::Query("failed".to_string()));
        assert!(result.is_err());
    }
}
