use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Errors from endpoint parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid address {address:?}: expected an IPv4 or IPv6 literal")]
    InvalidAddress { address: String },
}

/// A host/port pair used to request a listen or a connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkEndpoint(SocketAddr);

impl NetworkEndpoint {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    /// `0.0.0.0:0`, i.e. listen on every interface.
    pub fn any_ipv4() -> Self {
        Self(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))
    }

    /// `127.0.0.1:0`.
    pub fn loopback_ipv4() -> Self {
        Self(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0))
    }

    /// Parse an IP literal and pair it with `port`.
    ///
    /// Host names are not resolved here; the caller is expected to pass what
    /// the user typed into an address field.
    pub fn parse(address: &str, port: u16) -> Result<Self, EndpointError> {
        let trimmed = address.trim();
        let ip: IpAddr = trimmed.parse().map_err(|_| EndpointError::InvalidAddress {
            address: address.to_string(),
        })?;
        Ok(Self(SocketAddr::new(ip, port)))
    }

    /// Same address, different port.
    pub fn with_port(self, port: u16) -> Self {
        Self(SocketAddr::new(self.0.ip(), port))
    }

    pub fn address(&self) -> IpAddr {
        self.0.ip()
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    pub fn is_loopback(&self) -> bool {
        self.0.ip().is_loopback()
    }

    pub fn is_any(&self) -> bool {
        self.0.ip().is_unspecified()
    }
}

impl From<SocketAddr> for NetworkEndpoint {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl std::fmt::Display for NetworkEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
