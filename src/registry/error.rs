//! Registry error types

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Channel not found
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// Channel already has a publisher
    #[error("channel already has a publisher: {0}")]
    ChannelAlreadyPublishing(String),

    /// Channel belongs to a different organization
    #[error("channel {channel} belongs to org {owner}, not {requested}")]
    OrgMismatch {
        channel: String,
        owner: i64,
        requested: i64,
    },

    /// The registry could not answer the lookup
    #[error("registry unavailable: {0}")]
    Unavailable(String),
}
