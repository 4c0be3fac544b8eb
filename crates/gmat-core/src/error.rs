use thiserror::Error;

/// The error taxonomy shared by every component in the adaptive core.
///
/// Each variant is a failure *kind*, not a wrapper around a concrete error
/// type — repositories are generic over storage, so the core only ever sees
/// their errors as opaque strings (see `PersistenceFailure`).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
