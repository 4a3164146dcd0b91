//! Relay service contracts: allocations, join codes, anonymous sign-in.
//!
//! The hosted relay is a black box reached through [`RelayService`] and
//! [`AuthService`]. [`LocalRelay`] implements both in memory.
//!
//! # Invariants
//! - Join codes are six upper-case alphanumeric characters.
//! - Relay calls require initialized services and a signed-in player.

pub mod join_code;
pub mod local;
pub mod models;
pub mod service;

pub use join_code::{JOIN_CODE_LEN, JoinCodeError, generate_join_code, normalize_join_code};
pub use local::{FailPoint, LocalRelay, LocalRelayConfig, MAX_CONNECTIONS_LIMIT};
pub use models::{
    Allocation, CONNECTION_TYPE_DTLS, CONNECTION_TYPE_UDP, JoinAllocation, PlayerId,
    RelayServerEndpoint, ServicesState,
};
pub use service::{AuthService, RelayError, RelayService};

pub fn crate_info() -> &'static str {
    "hostlink-relay v0.1.0"
}
