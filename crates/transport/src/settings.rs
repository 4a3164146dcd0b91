use crate::relay_data::RelayServerData;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Driver configuration. Timeouts mirror common netcode defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub connect_timeout: Duration,
    pub max_connect_attempts: u32,
    pub disconnect_timeout: Duration,
    pub heartbeat_timeout: Duration,
    pub relay: Option<RelayServerData>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(1000),
            max_connect_attempts: 60,
            disconnect_timeout: Duration::from_millis(30_000),
            heartbeat_timeout: Duration::from_millis(500),
            relay: None,
        }
    }
}

impl NetworkSettings {
    pub fn with_relay_parameters(mut self, data: &RelayServerData) -> Self {
        self.relay = Some(data.clone());
        self
    }

    pub fn uses_relay(&self) -> bool {
        self.relay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_no_relay() {
        let s = NetworkSettings::default();
        assert!(!s.uses_relay());
        assert_eq!(s.max_connect_attempts, 60);
    }

    #[test]
    fn relay_parameters_attach() {
        let s = NetworkSettings::default().with_relay_parameters(&RelayServerData::empty());
        assert!(s.uses_relay());
    }
}
