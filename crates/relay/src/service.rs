use crate::models::{Allocation, JoinAllocation, PlayerId, ServicesState};
use std::future::Future;
use uuid::Uuid;

/// Errors surfaced by the relay and authentication services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("services are not initialized")]
    NotInitialized,
    #[error("player is not signed in")]
    NotSignedIn,
    #[error("max connections must be between 1 and {max}, got {requested}")]
    InvalidMaxConnections { requested: u32, max: u32 },
    #[error("allocation {0} not found")]
    AllocationNotFound(Uuid),
    #[error("no allocation for join code {0:?}")]
    JoinCodeNotFound(String),
    #[error("allocation {0} has no free slots")]
    AllocationFull(Uuid),
    #[error("relay service unavailable during {0}")]
    Unavailable(&'static str),
    #[error("relay internal error: {0}")]
    Internal(String),
}

/// The third-party relay: brokers UDP connectivity through a rendezvous
/// allocation identified by a short join code.
///
/// Calls are assumed reliable; callers do not wrap them in retries.
pub trait RelayService {
    /// Reserve an allocation for a host expecting up to `max_connections` peers.
    fn create_allocation(
        &self,
        max_connections: u32,
    ) -> impl Future<Output = Result<Allocation, RelayError>> + Send;

    /// Fetch (creating on first use) the join code for an allocation.
    fn get_join_code(
        &self,
        allocation_id: Uuid,
    ) -> impl Future<Output = Result<String, RelayError>> + Send;

    /// Take a slot in the allocation behind `join_code`.
    fn join_allocation(
        &self,
        join_code: &str,
    ) -> impl Future<Output = Result<JoinAllocation, RelayError>> + Send;
}

/// Platform services initialization plus anonymous sign-in.
pub trait AuthService {
    fn state(&self) -> ServicesState;

    fn initialize(&self) -> impl Future<Output = Result<(), RelayError>> + Send;

    fn is_signed_in(&self) -> bool;

    /// Sign in without credentials. Returns the current player when already
    /// signed in.
    fn sign_in_anonymously(&self) -> impl Future<Output = Result<PlayerId, RelayError>> + Send;
}
