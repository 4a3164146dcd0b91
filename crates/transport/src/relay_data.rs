use crate::error::TransportError;
use hostlink_common::NetworkEndpoint;
use hostlink_relay::{Allocation, JoinAllocation, RelayServerEndpoint};
use serde::{Deserialize, Serialize};

/// Relay parameters a driver needs to tunnel traffic through an allocation.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayServerData {
    pub endpoint: Option<NetworkEndpoint>,
    pub nonce: u16,
    pub allocation_id: [u8; 16],
    pub connection_data: Vec<u8>,
    pub host_connection_data: Vec<u8>,
    pub key: Vec<u8>,
    pub is_secure: bool,
}

/// Relay data for a host: the server binds with one, the local client
/// connects with the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRelayData {
    pub server: RelayServerData,
    pub thin_client: RelayServerData,
}

impl RelayServerData {
    /// No relay parameters: used for the server half of a pure client.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoint.is_none()
    }

    /// Relay endpoint port, or 0 when empty.
    pub fn port(&self) -> u16 {
        self.endpoint.map(|e| e.port()).unwrap_or(0)
    }

    /// Server-side data for a host allocation. The host's own connection
    /// data fills both connection fields.
    pub fn from_allocation(
        allocation: &Allocation,
        connection_type: &str,
    ) -> Result<Self, TransportError> {
        let region = select_endpoint(allocation.endpoint(connection_type), connection_type)?;
        Ok(Self {
            endpoint: Some(NetworkEndpoint::parse(&region.host, region.port)?),
            nonce: 0,
            allocation_id: allocation.allocation_id_bytes(),
            connection_data: allocation.connection_data.clone(),
            host_connection_data: allocation.connection_data.clone(),
            key: allocation.key.clone(),
            is_secure: region.secure,
        })
    }

    /// Client-side data for a player that joined with a join code.
    pub fn from_join_allocation(
        allocation: &JoinAllocation,
        connection_type: &str,
    ) -> Result<Self, TransportError> {
        let region = select_endpoint(allocation.endpoint(connection_type), connection_type)?;
        Ok(Self {
            endpoint: Some(NetworkEndpoint::parse(&region.host, region.port)?),
            nonce: 0,
            allocation_id: allocation.allocation_id_bytes(),
            connection_data: allocation.connection_data.clone(),
            host_connection_data: allocation.host_connection_data.clone(),
            key: allocation.key.clone(),
            is_secure: region.secure,
        })
    }

    /// Server and thin-client data from one host allocation, without a
    /// second relay round trip. Both halves carry identical parameters.
    pub fn for_host(
        allocation: &Allocation,
        connection_type: &str,
    ) -> Result<HostRelayData, TransportError> {
        let server = Self::from_allocation(allocation, connection_type)?;
        Ok(HostRelayData {
            thin_client: server.clone(),
            server,
        })
    }
}

fn select_endpoint<'a>(
    found: Option<&'a RelayServerEndpoint>,
    connection_type: &str,
) -> Result<&'a RelayServerEndpoint, TransportError> {
    found.ok_or_else(|| TransportError::MissingEndpoint {
        connection_type: connection_type.to_string(),
    })
}

impl std::fmt::Debug for RelayServerData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayServerData")
            .field("endpoint", &self.endpoint)
            .field("nonce", &self.nonce)
            .field("connection_data_len", &self.connection_data.len())
            .field("key_len", &self.key.len())
            .field("is_secure", &self.is_secure)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn allocation() -> Allocation {
        Allocation {
            allocation_id: Uuid::new_v4(),
            region: "local".into(),
            server_endpoints: vec![
                RelayServerEndpoint {
                    connection_type: "udp".into(),
                    host: "203.0.113.9".into(),
                    port: 30000,
                    secure: false,
                },
                RelayServerEndpoint {
                    connection_type: "dtls".into(),
                    host: "203.0.113.9".into(),
                    port: 30001,
                    secure: true,
                },
            ],
            connection_data: vec![7; 16],
            key: vec![9; 64],
        }
    }

    #[test]
    fn host_data_uses_connection_data_twice() {
        let alloc = allocation();
        let data = RelayServerData::from_allocation(&alloc, "dtls").unwrap();
        assert_eq!(data.port(), 30001);
        assert!(data.is_secure);
        assert_eq!(data.connection_data, data.host_connection_data);
        assert_eq!(&data.allocation_id, alloc.allocation_id.as_bytes());
    }

    #[test]
    fn for_host_halves_are_identical() {
        let host = RelayServerData::for_host(&allocation(), "udp").unwrap();
        assert_eq!(host.server, host.thin_client);
        assert!(!host.server.is_secure);
    }

    #[test]
    fn join_data_keeps_host_connection_data() {
        let alloc = allocation();
        let join = JoinAllocation {
            allocation_id: alloc.allocation_id,
            region: alloc.region.clone(),
            server_endpoints: alloc.server_endpoints.clone(),
            connection_data: vec![1; 16],
            host_connection_data: alloc.connection_data.clone(),
            key: alloc.key.clone(),
        };
        let data = RelayServerData::from_join_allocation(&join, "dtls").unwrap();
        assert_eq!(data.connection_data, vec![1; 16]);
        assert_eq!(data.host_connection_data, vec![7; 16]);
    }

    #[test]
    fn missing_connection_type_is_an_error() {
        let err = RelayServerData::from_allocation(&allocation(), "wss").unwrap_err();
        assert!(matches!(err, TransportError::MissingEndpoint { .. }));
    }

    #[test]
    fn unparseable_region_host_is_an_error() {
        let mut alloc = allocation();
        alloc.server_endpoints[1].host = "relay.example.invalid".into();
        let err = RelayServerData::from_allocation(&alloc, "dtls").unwrap_err();
        assert!(matches!(err, TransportError::Endpoint(_)));
    }

    #[test]
    fn empty_data() {
        let data = RelayServerData::empty();
        assert!(data.is_empty());
        assert_eq!(data.port(), 0);
    }

    #[test]
    fn debug_hides_key_material() {
        let data = RelayServerData::from_allocation(&allocation(), "dtls").unwrap();
        let s = format!("{data:?}");
        assert!(s.contains("key_len: 64"));
        assert!(!s.contains("[9, 9"));
    }
}
