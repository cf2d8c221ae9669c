use thiserror::Error;

#[derive(Error, Debug)]
pub enum EstateError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("external service error: {0}")]
    ExternalService(String),

    #[error("database error: {0}")]
    Database(String),
}
