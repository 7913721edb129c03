//! In-process cluster transport
//!
//! Nodes sharing a [`LocalCluster`] survey each other directly in memory.
//! Every survey reaches all member nodes, the caller's own node included,
//! concurrently and under a single deadline.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::survey::{SurveyDispatcher, SurveyReply};

use super::{SurveyTransport, TransportError};

/// Membership of an in-process cluster
#[derive(Clone, Default)]
pub struct LocalCluster {
    nodes: Arc<RwLock<Vec<Arc<NodeSlot>>>>,
}

/// A node's receiving side
struct NodeSlot {
    id: String,
    handler: RwLock<Option<Arc<SurveyDispatcher>>>,
    latency_ms: AtomicU64,
}

impl NodeSlot {
    async fn answer(&self, op: &str, data: Bytes) -> SurveyReply {
        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let handler = self.handler.read().await.clone();
        match handler {
            Some(dispatcher) => dispatcher.handle(op, data).await,
            None => {
                tracing::warn!(node = %self.id, op = %op, "Survey reached node without handler");
                SurveyReply::failed()
            }
        }
    }
}

impl LocalCluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the cluster
    ///
    /// A node already using `id` is replaced.
    pub async fn join(&self, id: impl Into<String>) -> LocalNode {
        let slot = Arc::new(NodeSlot {
            id: id.into(),
            handler: RwLock::new(None),
            latency_ms: AtomicU64::new(0),
        });

        let mut nodes = self.nodes.write().await;
        nodes.retain(|n| n.id != slot.id);
        nodes.push(Arc::clone(&slot));

        tracing::info!(node = %slot.id, members = nodes.len(), "Node joined cluster");

        LocalNode {
            slot,
            cluster: self.clone(),
        }
    }

    /// Remove a node from the cluster
    ///
    /// Returns whether a node with `id` was a member.
    pub async fn leave(&self, id: &str) -> bool {
        let mut nodes = self.nodes.write().await;
        let before = nodes.len();
        nodes.retain(|n| n.id != id);

        let removed = nodes.len() != before;
        if removed {
            tracing::info!(node = %id, members = nodes.len(), "Node left cluster");
        }
        removed
    }

    /// Get the number of member nodes
    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }
}

/// One member of a [`LocalCluster`]
#[derive(Clone)]
pub struct LocalNode {
    slot: Arc<NodeSlot>,
    cluster: LocalCluster,
}

impl LocalNode {
    /// Get the node ID
    pub fn id(&self) -> &str {
        &self.slot.id
    }

    /// Delay every answer of this node by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.slot
            .latency_ms
            .store(u64::try_from(latency.as_millis()).unwrap_or(u64::MAX), Ordering::Relaxed);
    }
}

impl SurveyTransport for LocalNode {
    async fn survey(
        &self,
        op: &str,
        data: Bytes,
        timeout: Duration,
    ) -> Result<Vec<SurveyReply>, TransportError> {
        let gather = async {
            // Snapshot membership so the lock isn't held while nodes answer
            let nodes: Vec<Arc<NodeSlot>> = self.cluster.nodes.read().await.clone();
            if nodes.is_empty() {
                return Err(TransportError::NoNodes);
            }

            tracing::debug!(node = %self.slot.id, op = %op, nodes = nodes.len(), "Survey sent");

            let answers = nodes.iter().map(|node| node.answer(op, data.clone()));
            Ok(join_all(answers).await)
        };

        tokio::time::timeout(timeout, gather)
            .await
            .map_err(|_| TransportError::Timeout(timeout))?
    }

    async fn on_survey(&self, dispatcher: Arc<SurveyDispatcher>) {
        let mut handler = self.slot.handler.write().await;
        if handler.is_some() {
            tracing::warn!(node = %self.slot.id, "Survey handler replaced");
        }
        *handler = Some(dispatcher);

        tracing::info!(node = %self.slot.id, "Survey handler registered");
    }
}
