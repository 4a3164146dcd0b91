//! World kernel: simulation contexts for the client and server sides of a session.
//!
//! # Invariants
//! - All state mutations flow through explicit operations.
//! - A disposed world holds no entities, components or resources.

pub mod world;

pub use world::{World, WorldEvent, WorldRole};

pub fn crate_info() -> &'static str {
    "hostlink-kernel v0.1.0"
}
