//! Minimal deterministic component model for netcode worlds.
//!
//! Components are stored in BTreeMaps for deterministic iteration order.
//! Each component type has its own storage keyed by EntityId.
//!
//! # Invariants
//! - All component mutations produce events.
//! - Iteration order is deterministic (BTreeMap).
//! - Structural changes made while systems run go through a [`CommandBuffer`].

mod command;
mod components;
mod store;

pub use command::{Command, CommandBuffer};
pub use components::{
    Component, ComponentKind, GoInGameRequest, NetworkId, NetworkStreamConnection,
    NetworkStreamInGame, NetworkStreamRequestConnect, NetworkStreamRequestListen,
    ReceiveRpcCommandRequest, SendRpcCommandRequest,
};
pub use store::{ComponentEvent, ComponentStore};

pub fn crate_info() -> &'static str {
    "hostlink-ecs v0.1.0"
}
