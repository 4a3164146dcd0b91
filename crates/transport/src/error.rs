use hostlink_common::EndpointError;

/// Errors from driver construction and relay parameter conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("relay offers no {connection_type:?} endpoint for this allocation")]
    MissingEndpoint { connection_type: String },
    #[error("endpoint error: {0}")]
    Endpoint(#[from] EndpointError),
    #[error("{side} relay driver requested without relay data")]
    EmptyRelayData { side: &'static str },
}
