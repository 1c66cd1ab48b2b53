use thiserror::Error;

pub type Result<T, E = ProtocolError> = core::result::Result<T, E>;

/// Failures decoding or encoding wire messages. These end the connection
/// that produced them and never reach the page state machine.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("header field {field} is not a valid {kind}: {value}")]
    InvalidHeader {
        field: &'static str,
        kind: &'static str,
        value: f64,
    },
}
