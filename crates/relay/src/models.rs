use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection type for plain UDP relay traffic.
pub const CONNECTION_TYPE_UDP: &str = "udp";
/// Connection type for DTLS-secured relay traffic. Default for sessions.
pub const CONNECTION_TYPE_DTLS: &str = "dtls";

/// One region endpoint offered by the relay for an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayServerEndpoint {
    /// `"udp"`, `"dtls"`, `"ws"` or `"wss"`.
    pub connection_type: String,
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

/// Allocation created by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub allocation_id: Uuid,
    pub region: String,
    pub server_endpoints: Vec<RelayServerEndpoint>,
    /// Opaque per-peer connection data handed to the transport.
    pub connection_data: Vec<u8>,
    /// HMAC key used to authenticate relay traffic.
    pub key: Vec<u8>,
}

impl Allocation {
    pub fn allocation_id_bytes(&self) -> [u8; 16] {
        *self.allocation_id.as_bytes()
    }

    /// The region endpoint for `connection_type`, if the relay offers one.
    pub fn endpoint(&self, connection_type: &str) -> Option<&RelayServerEndpoint> {
        find_endpoint(&self.server_endpoints, connection_type)
    }
}

/// Allocation slot obtained by a player joining with a join code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAllocation {
    pub allocation_id: Uuid,
    pub region: String,
    pub server_endpoints: Vec<RelayServerEndpoint>,
    pub connection_data: Vec<u8>,
    /// The host's connection data, so the relay can pair the two peers.
    pub host_connection_data: Vec<u8>,
    pub key: Vec<u8>,
}

impl JoinAllocation {
    pub fn allocation_id_bytes(&self) -> [u8; 16] {
        *self.allocation_id.as_bytes()
    }

    pub fn endpoint(&self, connection_type: &str) -> Option<&RelayServerEndpoint> {
        find_endpoint(&self.server_endpoints, connection_type)
    }
}

fn find_endpoint<'a>(
    endpoints: &'a [RelayServerEndpoint],
    connection_type: &str,
) -> Option<&'a RelayServerEndpoint> {
    endpoints
        .iter()
        .find(|e| e.connection_type.eq_ignore_ascii_case(connection_type))
}

/// Lifecycle of the platform services (relay + authentication).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServicesState {
    Uninitialized,
    Initialized,
}

/// Identity handed out by anonymous sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
