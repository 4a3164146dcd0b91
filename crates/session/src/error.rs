use crate::config::PlayType;
use crate::events::FlowKind;
use hostlink_common::EndpointError;
use hostlink_relay::{JoinCodeError, RelayError};
use hostlink_transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("relay error: {0}")]
    Relay(#[from] RelayError),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),
    #[error("invalid join code: {0}")]
    InvalidJoinCode(#[from] JoinCodeError),
    #[error("{flow} needs play type {required}, configured {configured}")]
    PlayTypeMismatch {
        flow: FlowKind,
        required: PlayType,
        configured: PlayType,
    },
}
