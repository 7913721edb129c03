//! Survey dispatcher
//!
//! Answers incoming surveys on behalf of this node. Operations are looked up
//! by name in a table filled at initialization; every failure is turned into
//! a status code so that a bad request never escapes the node.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{Error, Result};
use crate::registry::{ChannelLookup, SubscriberLookup};
use crate::stats::metrics::DispatchCounters;
use crate::stats::DispatchStats;

use super::codec;
use super::message::SurveyReply;
use super::op::{ManagedChannelsOp, NumSubscribersOp, SurveyOp};

type BoxedHandler = Box<dyn Fn(Bytes) -> BoxFuture<'static, Result<Bytes>> + Send + Sync>;

/// Routes survey requests to their operation handlers
pub struct SurveyDispatcher {
    ops: HashMap<&'static str, BoxedHandler>,
    counters: DispatchCounters,
}

impl SurveyDispatcher {
    /// Create a dispatcher with no operations
    pub fn new() -> Self {
        Self {
            ops: HashMap::new(),
            counters: DispatchCounters::default(),
        }
    }

    /// Create a dispatcher answering the standard operations from local lookups
    pub fn with_lookups<C, S>(channels: Arc<C>, subscribers: Arc<S>) -> Self
    where
        C: ChannelLookup,
        S: SubscriberLookup,
    {
        let mut dispatcher = Self::new();
        dispatcher.register(ManagedChannelsOp::new(channels));
        dispatcher.register(NumSubscribersOp::new(subscribers));
        dispatcher
    }

    /// Register an operation under its name
    ///
    /// A second registration under the same name replaces the first.
    pub fn register<O: SurveyOp>(&mut self, op: O) {
        let op = Arc::new(op);
        let handler: BoxedHandler = Box::new(move |data: Bytes| {
            let op = Arc::clone(&op);
            async move {
                let req = codec::decode::<O::Request>(&data)?;
                let resp = op.handle(req).await?;
                codec::encode(&resp)
            }
            .boxed()
        });

        if self.ops.insert(O::NAME, handler).is_some() {
            tracing::warn!(op = O::NAME, "Survey operation handler replaced");
        }
    }

    /// Check if an operation is registered
    pub fn handles(&self, op: &str) -> bool {
        self.ops.contains_key(op)
    }

    /// Registered operation names, sorted
    pub fn operations(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.ops.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Answer one survey request
    pub async fn handle(&self, op: &str, data: Bytes) -> SurveyReply {
        self.counters.record_handled();

        match self.try_handle(op, data).await {
            Ok(payload) => {
                tracing::debug!(op = %op, bytes = payload.len(), "Survey answered");
                SurveyReply::ok(payload)
            }
            Err(e) => {
                if matches!(e, Error::UnknownOperation(_)) {
                    self.counters.record_unknown();
                }
                self.counters.record_failed();
                tracing::warn!(op = %op, error = %e, "Survey failed");
                SurveyReply::failed()
            }
        }
    }

    async fn try_handle(&self, op: &str, data: Bytes) -> Result<Bytes> {
        let handler = self
            .ops
            .get(op)
            .ok_or_else(|| Error::UnknownOperation(op.to_string()))?;

        handler(data).await
    }

    /// Get dispatcher statistics
    pub fn stats(&self) -> DispatchStats {
        self.counters.snapshot()
    }
}

impl Default for SurveyDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
