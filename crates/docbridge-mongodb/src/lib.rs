//! MongoDB bridge for the docbridge framework
//!
//! This crate adapts the MongoDB driver to the host framework's bridge
//! contract: configuration-derived connection strings, a lazily-constructed
//! client with explicit release, a CRUD facade keyed by logical entity names,
//! and ascent over hierarchical parent references.
//!
//! # Features
//! - Lazy client construction, explicit `close(forced)` lifecycle
//! - Logical-to-physical collection name resolution
//! - Fail-fast identifier and criteria screening before driver contact
//! - Outcome logging correlated by tracking code
//! - Redacted diagnostics for the management console

pub mod bridge;
pub mod config;
pub mod connection;
pub mod hierarchy;
pub mod info;
pub mod query;
pub mod validation;

pub use bridge::{MongodbBridge, UpdateOptions, UpdateOutcome};
pub use config::{BridgeConfig, CollectionDefs, ConnectionOptions};
pub use connection::{Connection, PoolConfig};
pub use docbridge_common::{Bridge, BridgeError, HelpRecord, Result};
pub use hierarchy::{HierarchicalChain, PARENT_ID_FIELD};
pub use info::{DocumentSummary, ServiceInfo};
pub use query::QueryBuilder;
pub use validation::{
    normalize_document_id, validate_criteria, ValidatedCollectionName, ValidatedFieldName,
};
