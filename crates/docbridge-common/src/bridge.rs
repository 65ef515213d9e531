//! The bridge contract consumed by the host framework
//!
//! A bridge is a configured adapter that exposes one external service to the
//! host under a uniform lifecycle/introspection surface: a tracking code for
//! log correlation, an enabled flag, a help summary for the management
//! console, and an explicit release of the underlying resource.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A labeled record displayed by the host management console.
///
/// `label` maps a field key to its human-readable caption, `data` maps the
/// same key to the rendered value (plain text or pretty-printed JSON).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub title: String,
    pub label: BTreeMap<String, String>,
    pub data: BTreeMap<String, String>,
}

impl HelpRecord {
    /// Creates an empty record with the conventional `record` type tag
    pub fn record(title: impl Into<String>) -> Self {
        Self {
            record_type: "record".to_string(),
            title: title.into(),
            label: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }
}

/// Lifecycle and introspection contract every bridge implements
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Correlation code attached to every log line of this instance
    fn tracking_code(&self) -> &str;

    /// Whether the host should route traffic through this bridge
    fn enabled(&self) -> bool {
        true
    }

    /// Human-oriented summary records for the management console
    fn service_help(&self) -> Vec<HelpRecord>;

    /// Releases the underlying client. Must be a no-op when the bridge never
    /// connected or was already closed.
    async fn close(&self, forced: bool) -> Result<()>;
}
