//! Developer tooling: world inspector for session worlds.
//!
//! # Invariants
//! - Inspection is read-only.

mod inspector;

pub use inspector::{EntityInfo, RegistryEntry, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "hostlink-tools v0.1.0"
}
