//! Netcode systems for session worlds.
//!
//! A connection goes in game through one RPC round trip: the client marks
//! its connection and sends [`hostlink_ecs::GoInGameRequest`], the server
//! marks the source connection when the request arrives. No retry, no
//! timeout.

pub mod go_in_game;
pub mod link;
pub mod schedule;
pub mod system;

pub use go_in_game::{GoInGameClientSystem, GoInGameServerSystem};
pub use link::{LinkReport, LoopbackLink};
pub use schedule::SimulationSchedule;
pub use system::{System, WorldSystemFilter};

pub fn crate_info() -> &'static str {
    "hostlink-netcode v0.1.0"
}
