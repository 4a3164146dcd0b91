//! Shared types used across the hostlink workspace.

pub mod endpoint;
pub mod types;

pub use endpoint::{EndpointError, NetworkEndpoint};
pub use types::{EntityId, WorldId};

pub fn crate_info() -> &'static str {
    "hostlink-common v0.1.0"
}
