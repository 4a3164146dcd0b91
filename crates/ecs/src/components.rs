use hostlink_common::{EntityId, NetworkEndpoint};
use serde::{Deserialize, Serialize};

/// Ask the network-stream layer to start listening on `endpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStreamRequestListen {
    pub endpoint: NetworkEndpoint,
}

/// Ask the network-stream layer to connect to `endpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStreamRequestConnect {
    pub endpoint: NetworkEndpoint,
}

/// Server-assigned id of a connection. Present on both sides once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(pub u32);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An established connection to a remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStreamConnection {
    pub remote: NetworkEndpoint,
}

/// Marks a connection as in game: snapshots and commands flow from here on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkStreamInGame;

/// RPC sent by a client once it has a network id and wants to start playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoInGameRequest;

/// Outgoing RPC: deliver the entity's RPC payload over `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRpcCommandRequest {
    pub target: EntityId,
}

/// Incoming RPC: the entity's RPC payload arrived over `source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveRpcCommandRequest {
    pub source: EntityId,
}

/// Any component value the store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    RequestListen(NetworkStreamRequestListen),
    RequestConnect(NetworkStreamRequestConnect),
    NetworkId(NetworkId),
    Connection(NetworkStreamConnection),
    InGame(NetworkStreamInGame),
    GoInGame(GoInGameRequest),
    SendRpc(SendRpcCommandRequest),
    ReceiveRpc(ReceiveRpcCommandRequest),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::RequestListen(_) => ComponentKind::RequestListen,
            Self::RequestConnect(_) => ComponentKind::RequestConnect,
            Self::NetworkId(_) => ComponentKind::NetworkId,
            Self::Connection(_) => ComponentKind::Connection,
            Self::InGame(_) => ComponentKind::InGame,
            Self::GoInGame(_) => ComponentKind::GoInGame,
            Self::SendRpc(_) => ComponentKind::SendRpc,
            Self::ReceiveRpc(_) => ComponentKind::ReceiveRpc,
        }
    }
}

impl From<NetworkStreamRequestListen> for Component {
    fn from(c: NetworkStreamRequestListen) -> Self {
        Self::RequestListen(c)
    }
}

impl From<NetworkStreamRequestConnect> for Component {
    fn from(c: NetworkStreamRequestConnect) -> Self {
        Self::RequestConnect(c)
    }
}

impl From<NetworkId> for Component {
    fn from(c: NetworkId) -> Self {
        Self::NetworkId(c)
    }
}

impl From<NetworkStreamConnection> for Component {
    fn from(c: NetworkStreamConnection) -> Self {
        Self::Connection(c)
    }
}

impl From<NetworkStreamInGame> for Component {
    fn from(c: NetworkStreamInGame) -> Self {
        Self::InGame(c)
    }
}

impl From<GoInGameRequest> for Component {
    fn from(c: GoInGameRequest) -> Self {
        Self::GoInGame(c)
    }
}

impl From<SendRpcCommandRequest> for Component {
    fn from(c: SendRpcCommandRequest) -> Self {
        Self::SendRpc(c)
    }
}

impl From<ReceiveRpcCommandRequest> for Component {
    fn from(c: ReceiveRpcCommandRequest) -> Self {
        Self::ReceiveRpc(c)
    }
}

/// Discriminant of [`Component`], used for removal and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    RequestListen,
    RequestConnect,
    NetworkId,
    Connection,
    InGame,
    GoInGame,
    SendRpc,
    ReceiveRpc,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 8] = [
        Self::RequestListen,
        Self::RequestConnect,
        Self::NetworkId,
        Self::Connection,
        Self::InGame,
        Self::GoInGame,
        Self::SendRpc,
        Self::ReceiveRpc,
    ];
}
