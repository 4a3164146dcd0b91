use hostlink_relay::CONNECTION_TYPE_DTLS;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;
pub const DEFAULT_PORT: u16 = 7777;
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";

/// Which simulations this process is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayType {
    Client,
    Server,
    #[default]
    ClientAndServer,
}

impl PlayType {
    pub fn includes_client(self) -> bool {
        matches!(self, Self::Client | Self::ClientAndServer)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Server => "server",
            Self::ClientAndServer => "client-and-server",
        }
    }
}

impl std::fmt::Display for PlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            "client-and-server" | "clientandserver" => Ok(Self::ClientAndServer),
            other => Err(ConfigError::UnknownPlayType(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown play type {0:?}")]
    UnknownPlayType(String),
}

/// Session settings. Every field has a default, so a config file only needs
/// the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_connections: u32,
    pub listen_address: String,
    pub port: u16,
    /// Relay region endpoint flavour: `dtls` or `udp`.
    pub connection_type: String,
    pub server_world_name: String,
    pub client_world_name: String,
    pub play_type: PlayType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            listen_address: DEFAULT_LISTEN_ADDRESS.into(),
            port: DEFAULT_PORT,
            connection_type: CONNECTION_TYPE_DTLS.into(),
            server_world_name: "ServerWorld".into(),
            client_world_name: "ClientWorld".into(),
            play_type: PlayType::ClientAndServer,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
