//! Core error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Missing payload field '{field}' in success envelope")]
    MissingPayload { field: &'static str },

    #[error("Row decode error: {0}")]
    RowDecode(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
