//! Survey caller
//!
//! Issues one logical query across the whole cluster and folds every node's
//! reply into a single answer. A single failed or undecodable reply fails the
//! whole call: no partial aggregate is ever returned.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::registry::ManagedChannel;
use crate::stats::metrics::SurveyCounters;
use crate::stats::SurveyStats;
use crate::transport::SurveyTransport;

use super::codec;
use super::config::SurveyConfig;
use super::dispatcher::SurveyDispatcher;
use super::message::{
    ManagedChannelsRequest, ManagedChannelsResponse, NumSubscribersRequest,
    NumSubscribersResponse, SurveyReply, MANAGED_STREAMS_OP, NUM_CHANNEL_SUBSCRIBERS_OP,
};

/// Cluster-facing survey API
pub struct SurveyCaller<T: SurveyTransport> {
    transport: Arc<T>,
    config: SurveyConfig,
    counters: SurveyCounters,
}

impl<T: SurveyTransport> SurveyCaller<T> {
    /// Create a caller with default timeouts
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_config(transport, SurveyConfig::default())
    }

    /// Create a caller with custom timeouts
    pub fn with_config(transport: Arc<T>, config: SurveyConfig) -> Self {
        Self {
            transport,
            config,
            counters: SurveyCounters::default(),
        }
    }

    /// Get the caller configuration
    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Install `dispatcher` as this node's survey handler
    pub async fn setup_handlers(&self, dispatcher: Arc<SurveyDispatcher>) {
        self.transport.on_survey(dispatcher).await;
    }

    /// List the channels managed anywhere in the cluster for an organization
    ///
    /// Channels reported by several nodes appear once; the first report wins.
    /// Order follows node reply order, then each node's own order.
    pub async fn call_managed_channels(&self, org_id: i64) -> Result<Vec<ManagedChannel>> {
        let result = self.managed_channels(org_id).await;
        self.finish(MANAGED_STREAMS_OP, result)
    }

    async fn managed_channels(&self, org_id: i64) -> Result<Vec<ManagedChannel>> {
        let replies = self
            .call(
                MANAGED_STREAMS_OP,
                &ManagedChannelsRequest { org_id },
                self.config.managed_channels_timeout,
            )
            .await?;

        let mut channels = Vec::new();
        let mut seen = HashSet::new();

        for reply in replies {
            let resp: ManagedChannelsResponse = decode_reply(&reply)?;
            for channel in resp.channels {
                if seen.insert(channel.channel.clone()) {
                    channels.push(channel);
                }
            }
        }

        Ok(channels)
    }

    /// Count a channel's subscribers across the cluster
    pub async fn call_num_subscribers(&self, channel: &str) -> Result<usize> {
        let result = self.num_subscribers(channel).await;
        self.finish(NUM_CHANNEL_SUBSCRIBERS_OP, result)
    }

    async fn num_subscribers(&self, channel: &str) -> Result<usize> {
        let replies = self
            .call(
                NUM_CHANNEL_SUBSCRIBERS_OP,
                &NumSubscribersRequest {
                    channel: channel.to_string(),
                },
                self.config.num_subscribers_timeout,
            )
            .await?;

        let mut total: usize = 0;
        for reply in replies {
            let resp: NumSubscribersResponse = decode_reply(&reply)?;
            total = total
                .checked_add(resp.num_subscribers)
                .ok_or(Error::CountOverflow)?;
        }

        Ok(total)
    }

    async fn call<R: Serialize>(
        &self,
        op: &str,
        req: &R,
        timeout: Duration,
    ) -> Result<Vec<SurveyReply>> {
        self.counters.record_call();

        let data = codec::encode(req)?;
        let replies = self.transport.survey(op, data, timeout).await?;
        self.counters.record_replies(replies.len());

        if replies.is_empty() {
            return Err(Error::NoReplies);
        }

        tracing::debug!(op = %op, replies = replies.len(), "Survey replies gathered");

        Ok(replies)
    }

    fn finish<V>(&self, op: &str, result: Result<V>) -> Result<V> {
        if let Err(ref e) = result {
            self.counters.record_failure();
            tracing::debug!(op = %op, error = %e, "Survey call failed");
        }
        result
    }

    /// Get caller statistics
    pub fn stats(&self) -> SurveyStats {
        self.counters.snapshot()
    }
}

/// Check a reply's status and decode its payload
fn decode_reply<R: serde::de::DeserializeOwned>(reply: &SurveyReply) -> Result<R> {
    if !reply.is_ok() {
        return Err(Error::UnexpectedStatus(reply.code));
    }
    codec::decode(&reply.data)
}
