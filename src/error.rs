//! Error types
//!
//! Every failure a survey call can surface to its invoker. Dispatcher-side
//! failures never leave the node as errors; they are turned into status codes.

use crate::registry::RegistryError;
use crate::transport::TransportError;

/// Result type alias for survey operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for survey operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request or response payload could not be decoded
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// A request or response could not be encoded
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// The dispatcher has no handler for the operation
    #[error("method not found: {0}")]
    UnknownOperation(String),

    /// A local registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A node answered with a non-zero status code
    #[error("unexpected survey code: {0}")]
    UnexpectedStatus(u32),

    /// The transport could not complete the survey
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Aggregated subscriber counts exceed the counter range
    #[error("subscriber count overflow")]
    CountOverflow,

    /// The survey completed without a single reply
    #[error("survey returned no replies")]
    NoReplies,
}
