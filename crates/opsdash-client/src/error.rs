//! Client error types.

use thiserror::Error;

/// A single transport-level failure: the request never produced a
/// well-formed envelope (network error or unparseable body).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Transport failure after {attempts} attempts: {last}")]
    Transport {
        attempts: u32,
        last: TransportFailure,
    },

    #[error("HTTP client build failed: {0}")]
    Build(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
