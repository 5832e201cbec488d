use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Generic(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Authentication provider error: {0}")]
    Generic(String),
}

/// Everything the catalog/registrar/gateway protocol can report to a caller.
/// Object-store and catalog I/O failures are translated into one of these at
/// the component boundary; raw transport errors never leak out.
#[derive(Error, Debug)]
pub enum DropgateError {
    #[error("Missing required field: {0}")]
    BadRequest(&'static str),

    #[error("Asset not found")]
    NotFound,

    #[error("Invalid download token")]
    Forbidden,

    #[error("Catalog unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Weak password: {0}")]
    WeakPassword(&'static str),

    /// One side of a register/revoke cycle landed and the other did not.
    /// The message names the orphaned object or dangling entry so an
    /// operator can clean up before retrying.
    #[error("Partial failure: {0}")]
    PartialFailure(String),
}
