use serde::{Deserialize, Serialize};

/// The four ways a session can be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowKind {
    HostRelay,
    JoinRelay,
    HostDirect,
    JoinDirect,
}

impl FlowKind {
    pub fn is_host(self) -> bool {
        matches!(self, Self::HostRelay | Self::HostDirect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HostRelay => "host-relay",
            Self::JoinRelay => "join-relay",
            Self::HostDirect => "host-direct",
            Self::JoinDirect => "join-direct",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notifications for whatever presents the session (menu, CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A relay host obtained the code other players join with.
    JoinCodeGenerated(String),
    /// Worlds are set up; the menu can hide.
    ConnectionComplete(FlowKind),
}
