//! In-memory relay and authentication backend.
//!
//! Keeps allocations and join codes in process memory so the session flows
//! can run without the hosted relay service. Used by tests and by the CLI's
//! offline mode.

use crate::join_code::generate_join_code;
use crate::models::{
    Allocation, CONNECTION_TYPE_DTLS, CONNECTION_TYPE_UDP, JoinAllocation, PlayerId,
    RelayServerEndpoint, ServicesState,
};
use crate::service::{AuthService, RelayError, RelayService};
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Upper bound the relay accepts for `max_connections`.
pub const MAX_CONNECTIONS_LIMIT: u32 = 100;

const CONNECTION_DATA_LEN: usize = 16;
const KEY_LEN: usize = 64;

/// Operations that can be made to fail on their next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Initialize,
    SignIn,
    CreateAllocation,
    GetJoinCode,
    JoinAllocation,
}

impl FailPoint {
    fn operation(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::SignIn => "sign-in",
            Self::CreateAllocation => "create allocation",
            Self::GetJoinCode => "get join code",
            Self::JoinAllocation => "join allocation",
        }
    }
}

/// Region endpoint layout advertised by [`LocalRelay`].
#[derive(Debug, Clone)]
pub struct LocalRelayConfig {
    pub region: String,
    pub host: String,
    pub udp_port: u16,
    pub dtls_port: u16,
}

impl Default for LocalRelayConfig {
    fn default() -> Self {
        Self {
            region: "local".into(),
            host: "127.0.0.1".into(),
            udp_port: 30000,
            dtls_port: 30001,
        }
    }
}

#[derive(Debug)]
struct AllocationRecord {
    allocation: Allocation,
    max_connections: u32,
    joined: u32,
}

#[derive(Debug)]
struct RelayState {
    services: ServicesState,
    player: Option<PlayerId>,
    allocations: HashMap<Uuid, AllocationRecord>,
    join_codes: HashMap<String, Uuid>,
    failures: HashSet<FailPoint>,
    calls: Vec<&'static str>,
}

/// In-memory relay. Cheap to clone; clones share the same tables.
#[derive(Debug, Clone)]
pub struct LocalRelay {
    config: Arc<LocalRelayConfig>,
    state: Arc<Mutex<RelayState>>,
}

impl Default for LocalRelay {
    fn default() -> Self {
        Self::new(LocalRelayConfig::default())
    }
}

impl LocalRelay {
    pub fn new(config: LocalRelayConfig) -> Self {
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(RelayState {
                services: ServicesState::Uninitialized,
                player: None,
                allocations: HashMap::new(),
                join_codes: HashMap::new(),
                failures: HashSet::new(),
                calls: Vec::new(),
            })),
        }
    }

    pub fn config(&self) -> &LocalRelayConfig {
        &self.config
    }

    /// Make the next call of `point` fail with [`RelayError::Unavailable`].
    pub fn fail_next(&self, point: FailPoint) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert(point);
        }
    }

    /// Names of the operations called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// Number of live allocations.
    pub fn allocation_count(&self) -> usize {
        self.state.lock().map(|s| s.allocations.len()).unwrap_or(0)
    }

    /// Number of slots taken in `allocation_id`.
    pub fn joined_count(&self, allocation_id: Uuid) -> Option<u32> {
        let state = self.state.lock().ok()?;
        state.allocations.get(&allocation_id).map(|r| r.joined)
    }

    fn lock(&self) -> Result<MutexGuard<'_, RelayState>, RelayError> {
        self.state
            .lock()
            .map_err(|_| RelayError::Internal("relay state mutex poisoned".into()))
    }

    /// Record the call and trip a pending failure for it, if any.
    fn enter(state: &mut RelayState, point: FailPoint) -> Result<(), RelayError> {
        state.calls.push(point.operation());
        if state.failures.remove(&point) {
            tracing::warn!(operation = point.operation(), "injected relay failure");
            return Err(RelayError::Unavailable(point.operation()));
        }
        Ok(())
    }

    fn require_session(state: &RelayState) -> Result<(), RelayError> {
        if state.services != ServicesState::Initialized {
            return Err(RelayError::NotInitialized);
        }
        if state.player.is_none() {
            return Err(RelayError::NotSignedIn);
        }
        Ok(())
    }

    fn server_endpoints(&self) -> Vec<RelayServerEndpoint> {
        vec![
            RelayServerEndpoint {
                connection_type: CONNECTION_TYPE_UDP.into(),
                host: self.config.host.clone(),
                port: self.config.udp_port,
                secure: false,
            },
            RelayServerEndpoint {
                connection_type: CONNECTION_TYPE_DTLS.into(),
                host: self.config.host.clone(),
                port: self.config.dtls_port,
                secure: true,
            },
        ]
    }

    fn do_create_allocation(&self, max_connections: u32) -> Result<Allocation, RelayError> {
        let mut state = self.lock()?;
        Self::enter(&mut state, FailPoint::CreateAllocation)?;
        Self::require_session(&state)?;
        if max_connections == 0 || max_connections > MAX_CONNECTIONS_LIMIT {
            return Err(RelayError::InvalidMaxConnections {
                requested: max_connections,
                max: MAX_CONNECTIONS_LIMIT,
            });
        }

        let allocation = Allocation {
            allocation_id: Uuid::new_v4(),
            region: self.config.region.clone(),
            server_endpoints: self.server_endpoints(),
            connection_data: random_bytes(CONNECTION_DATA_LEN),
            key: random_bytes(KEY_LEN),
        };
        state.allocations.insert(
            allocation.allocation_id,
            AllocationRecord {
                allocation: allocation.clone(),
                max_connections,
                joined: 0,
            },
        );
        tracing::info!(allocation = %allocation.allocation_id, max_connections, "allocation created");
        Ok(allocation)
    }

    fn do_get_join_code(&self, allocation_id: Uuid) -> Result<String, RelayError> {
        let mut state = self.lock()?;
        Self::enter(&mut state, FailPoint::GetJoinCode)?;
        Self::require_session(&state)?;
        if !state.allocations.contains_key(&allocation_id) {
            return Err(RelayError::AllocationNotFound(allocation_id));
        }
        if let Some((code, _)) = state.join_codes.iter().find(|(_, id)| **id == allocation_id) {
            return Ok(code.clone());
        }

        let code = loop {
            let candidate = generate_join_code();
            if !state.join_codes.contains_key(&candidate) {
                break candidate;
            }
        };
        state.join_codes.insert(code.clone(), allocation_id);
        Ok(code)
    }

    fn do_join_allocation(&self, join_code: &str) -> Result<JoinAllocation, RelayError> {
        let mut state = self.lock()?;
        Self::enter(&mut state, FailPoint::JoinAllocation)?;
        Self::require_session(&state)?;

        let code = join_code.trim().to_ascii_uppercase();
        let allocation_id = *state
            .join_codes
            .get(&code)
            .ok_or_else(|| RelayError::JoinCodeNotFound(code.clone()))?;
        let record = state
            .allocations
            .get_mut(&allocation_id)
            .ok_or(RelayError::AllocationNotFound(allocation_id))?;
        if record.joined >= record.max_connections {
            return Err(RelayError::AllocationFull(allocation_id));
        }
        record.joined += 1;

        let host = &record.allocation;
        tracing::info!(allocation = %allocation_id, joined = record.joined, "allocation joined");
        Ok(JoinAllocation {
            allocation_id,
            region: host.region.clone(),
            server_endpoints: host.server_endpoints.clone(),
            connection_data: random_bytes(CONNECTION_DATA_LEN),
            host_connection_data: host.connection_data.clone(),
            key: host.key.clone(),
        })
    }

    fn do_initialize(&self) -> Result<(), RelayError> {
        let mut state = self.lock()?;
        Self::enter(&mut state, FailPoint::Initialize)?;
        state.services = ServicesState::Initialized;
        tracing::debug!("local services initialized");
        Ok(())
    }

    fn do_sign_in(&self) -> Result<PlayerId, RelayError> {
        let mut state = self.lock()?;
        Self::enter(&mut state, FailPoint::SignIn)?;
        if state.services != ServicesState::Initialized {
            return Err(RelayError::NotInitialized);
        }
        if let Some(player) = &state.player {
            return Ok(player.clone());
        }
        let player = PlayerId(Uuid::new_v4().simple().to_string());
        tracing::info!(player = %player, "signed in anonymously");
        state.player = Some(player.clone());
        Ok(player)
    }
}

impl RelayService for LocalRelay {
    async fn create_allocation(&self, max_connections: u32) -> Result<Allocation, RelayError> {
        self.do_create_allocation(max_connections)
    }

    async fn get_join_code(&self, allocation_id: Uuid) -> Result<String, RelayError> {
        self.do_get_join_code(allocation_id)
    }

    async fn join_allocation(&self, join_code: &str) -> Result<JoinAllocation, RelayError> {
        self.do_join_allocation(join_code)
    }
}

impl AuthService for LocalRelay {
    fn state(&self) -> ServicesState {
        self.state
            .lock()
            .map(|s| s.services)
            .unwrap_or(ServicesState::Uninitialized)
    }

    async fn initialize(&self) -> Result<(), RelayError> {
        self.do_initialize()
    }

    fn is_signed_in(&self) -> bool {
        self.state.lock().map(|s| s.player.is_some()).unwrap_or(false)
    }

    async fn sign_in_anonymously(&self) -> Result<PlayerId, RelayError> {
        self.do_sign_in()
    }
}

fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill(&mut bytes[..]);
    bytes
}
