//! Input screening for bridge operations
//!
//! Everything here runs before any driver call: identifier normalization,
//! collection and field name checks, and a screen for criteria operators that
//! would execute server-side JavaScript.

use bson::{oid::ObjectId, Bson, Document as BsonDocument};
use docbridge_common::{BridgeError, Result};
use tracing::warn;

/// Maximum allowed length for collection names (MongoDB allows 255; the
/// bridge is more conservative)
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Maximum allowed length for field names
const MAX_FIELD_NAME_LENGTH: usize = 1024;

/// Criteria operators that execute JavaScript on the server
const DANGEROUS_OPERATORS: &[&str] = &["$where", "$function", "$accumulator"];

/// Normalizes a plain identifier to the driver's native id type.
///
/// Fails with `EmptyDocumentId` on a blank id and `InvalidDocumentId` when
/// the value does not parse as an ObjectId. Neither failure touches the
/// driver.
pub fn normalize_document_id(entity: &str, id: &str) -> Result<ObjectId> {
    if id.trim().is_empty() {
        return Err(BridgeError::EmptyDocumentId {
            entity: entity.to_string(),
        });
    }
    ObjectId::parse_str(id).map_err(|err| BridgeError::InvalidDocumentId {
        value: id.to_string(),
        reason: err.to_string(),
    })
}

/// Physical collection name checked against injection and reserved patterns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    /// Validates a physical collection name.
    ///
    /// # Errors
    /// Returns `Validation` if the name is empty, too long, contains null
    /// bytes or `$`, or starts with the reserved `system.` prefix.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(BridgeError::Validation(
                "collection name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_COLLECTION_NAME_LENGTH {
            return Err(BridgeError::Validation(format!(
                "collection name exceeds maximum length of {} characters: '{}'",
                MAX_COLLECTION_NAME_LENGTH, name
            )));
        }

        if name.contains('\0') {
            return Err(BridgeError::Validation(
                "collection name cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with("system.") {
            return Err(BridgeError::Validation(format!(
                "collection name cannot start with 'system.' (reserved): '{}'",
                name
            )));
        }

        if name.contains('$') {
            return Err(BridgeError::Validation(format!(
                "collection name cannot contain '$' character: '{}'",
                name
            )));
        }

        if name.contains("..") || name.contains("//") {
            warn!(collection = name, "collection name contains suspicious pattern");
        }

        Ok(ValidatedCollectionName {
            name: name.to_string(),
        })
    }

    /// Returns the validated collection name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedCollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Caller-supplied field name checked against operator injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFieldName {
    name: String,
}

impl ValidatedFieldName {
    /// Validates a field name used in a criteria position.
    ///
    /// # Errors
    /// Returns `Validation` if the name is empty, too long, contains null
    /// bytes, or starts with `$`.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(BridgeError::Validation(
                "field name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_FIELD_NAME_LENGTH {
            return Err(BridgeError::Validation(format!(
                "field name exceeds maximum length of {} characters",
                MAX_FIELD_NAME_LENGTH
            )));
        }

        if name.contains('\0') {
            return Err(BridgeError::Validation(
                "field name cannot contain null bytes".to_string(),
            ));
        }

        if name.starts_with('$') {
            return Err(BridgeError::Validation(format!(
                "field name cannot start with '$' (reserved for operators): '{}'",
                name
            )));
        }

        Ok(ValidatedFieldName {
            name: name.to_string(),
        })
    }

    /// Returns the validated field name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedFieldName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedFieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Screens caller-supplied criteria for operators that execute JavaScript
pub fn validate_criteria(criteria: &BsonDocument) -> Result<()> {
    for (key, value) in criteria {
        if DANGEROUS_OPERATORS.contains(&key.as_str()) {
            return Err(BridgeError::Validation(format!(
                "operator '{}' is not allowed in criteria",
                key
            )));
        }
        validate_value(value)?;
    }
    Ok(())
}

fn validate_value(value: &Bson) -> Result<()> {
    match value {
        Bson::Document(document) => validate_criteria(document),
        Bson::Array(items) => items.iter().try_for_each(validate_value),
        _ => Ok(()),
    }
}
