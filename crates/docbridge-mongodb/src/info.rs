//! Diagnostics surface types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CollectionDefs, ConnectionOptions};

/// Redacted view of a bridge's configuration.
///
/// `connection_info` is always the redacted copy and `url` is computed from
/// that copy, so the password appears as `***` in both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub connection_info: ConnectionOptions,
    pub url: String,
    pub collection_defs: CollectionDefs,
}

/// Per-collection document counts over the configured collections that
/// actually exist in the database. Both maps are keyed by physical
/// collection name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub label: BTreeMap<String, String>,
    pub count: BTreeMap<String, u64>,
}
