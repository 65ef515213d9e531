//! Common contract for docbridge bridges
//!
//! This crate holds what the host framework sees of every bridge: the unified
//! error type and the lifecycle/introspection trait with its management-console
//! record format.

pub mod bridge;
pub mod error;

pub use bridge::{Bridge, HelpRecord};
pub use error::{BridgeError, Result};
