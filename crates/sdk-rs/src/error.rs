//! Client error types.

use hapi_core::CoreError;
use hapi_registry::RegistryError;
use thiserror::Error;

/// Errors returned by [`HapiCore`](crate::HapiCore) implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A UUID argument could not be parsed
    #[error("Invalid UUID: {0}")]
    InvalidUuid(String),

    /// An address is not valid for the network's schema
    #[error("Invalid {schema} address: {address}")]
    InvalidAddress {
        /// Schema the address was checked against
        schema: String,
        /// The rejected address
        address: String,
    },

    /// Malformed argument
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// No reporter is registered for the signing key
    #[error("The reporter does not exist")]
    InvalidReporter,

    /// The operation needs token accounts the client was not given
    #[error("No {0} token accounts configured")]
    AbsentTokenAccount(&'static str),

    /// The registry rejected the operation
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Shared registry state is unusable after a panic
    #[error("Registry state poisoned")]
    Poisoned,
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidUuid(value) => ClientError::InvalidUuid(value),
            other => ClientError::InvalidData(other.to_string()),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
