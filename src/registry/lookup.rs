//! Read-only lookup interfaces used by survey handlers
//!
//! Implementations must tolerate concurrent reads: a node answers several
//! surveys at once alongside its ordinary pub/sub traffic.

use std::future::Future;

use super::channel::ManagedChannel;
use super::error::RegistryError;

/// Lists the channels a node actively manages
pub trait ChannelLookup: Send + Sync + 'static {
    /// Channels managed by this node for the given organization
    fn managed_channels(
        &self,
        org_id: i64,
    ) -> impl Future<Output = Result<Vec<ManagedChannel>, RegistryError>> + Send;
}

/// Counts the subscribers a node holds locally
pub trait SubscriberLookup: Send + Sync + 'static {
    /// Local subscriber count for a channel, 0 when the channel is unknown
    fn num_subscribers(&self, channel: &str) -> impl Future<Output = usize> + Send;
}
