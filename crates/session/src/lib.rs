//! Multiplayer session bootstrap.
//!
//! [`GameBootstrap`] runs one of four connect flows (host or join, through
//! the relay or over direct UDP) and leaves the resulting server and client
//! worlds in its [`WorldRegistry`].
//!
//! # Invariants
//! - Every flow disposes all existing worlds before creating new ones.
//! - At most one server world and one client world are registered.
//! - Host flows inject into the server world, join flows into the client.
//! - A relay host announces its join code before `ConnectionComplete`.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod events;
pub mod registry;

pub use bootstrap::GameBootstrap;
pub use config::{ConfigError, PlayType, SessionConfig};
pub use error::SessionError;
pub use events::{FlowKind, SessionEvent};
pub use registry::WorldRegistry;

pub fn crate_info() -> &'static str {
    "hostlink-session v0.1.0"
}
