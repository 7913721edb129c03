//! Typed survey operations
//!
//! Each operation owns its request and response types. The dispatcher erases
//! them behind the operation name, so adding an operation never touches the
//! existing ones.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::registry::{ChannelLookup, SubscriberLookup};

use super::message::{
    ManagedChannelsRequest, ManagedChannelsResponse, NumSubscribersRequest,
    NumSubscribersResponse, MANAGED_STREAMS_OP, NUM_CHANNEL_SUBSCRIBERS_OP,
};

/// A survey operation answered locally by every node
pub trait SurveyOp: Send + Sync + 'static {
    /// Operation name used on the wire
    const NAME: &'static str;

    /// Decoded request payload
    type Request: DeserializeOwned + Send + 'static;

    /// Response payload to encode
    type Response: Serialize + Send + 'static;

    /// Answer one request from this node's local state
    fn handle(&self, req: Self::Request) -> impl Future<Output = Result<Self::Response>> + Send;
}

/// Lists the channels this node manages for an organization
pub struct ManagedChannelsOp<C> {
    channels: Arc<C>,
}

impl<C> ManagedChannelsOp<C> {
    pub fn new(channels: Arc<C>) -> Self {
        Self { channels }
    }
}

impl<C: ChannelLookup> SurveyOp for ManagedChannelsOp<C> {
    const NAME: &'static str = MANAGED_STREAMS_OP;
    type Request = ManagedChannelsRequest;
    type Response = ManagedChannelsResponse;

    async fn handle(&self, req: ManagedChannelsRequest) -> Result<ManagedChannelsResponse> {
        let channels = self.channels.managed_channels(req.org_id).await?;
        Ok(ManagedChannelsResponse { channels })
    }
}

/// Counts this node's subscribers of a channel
pub struct NumSubscribersOp<S> {
    subscribers: Arc<S>,
}

impl<S> NumSubscribersOp<S> {
    pub fn new(subscribers: Arc<S>) -> Self {
        Self { subscribers }
    }
}

impl<S: SubscriberLookup> SurveyOp for NumSubscribersOp<S> {
    const NAME: &'static str = NUM_CHANNEL_SUBSCRIBERS_OP;
    type Request = NumSubscribersRequest;
    type Response = NumSubscribersResponse;

    async fn handle(&self, req: NumSubscribersRequest) -> Result<NumSubscribersResponse> {
        let num_subscribers = self.subscribers.num_subscribers(&req.channel).await;
        Ok(NumSubscribersResponse { num_subscribers })
    }
}
