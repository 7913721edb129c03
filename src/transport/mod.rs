//! Cluster transport abstraction
//!
//! The survey layer only needs two things from the cluster: a way to send one
//! request to every reachable node and gather the replies under a deadline,
//! and a way to install this node's handler for incoming surveys.

pub mod local;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::survey::{SurveyDispatcher, SurveyReply};

pub use local::{LocalCluster, LocalNode};

/// Error type for transport operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// No node could be reached
    #[error("no reachable nodes")]
    NoNodes,

    /// The deadline elapsed before every node replied
    #[error("survey timed out after {0:?}")]
    Timeout(Duration),

    /// The transport is shut down or otherwise unusable
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Broadcast/gather transport connecting the nodes of a cluster
pub trait SurveyTransport: Send + Sync + 'static {
    /// Send `data` under operation `op` to every reachable node
    ///
    /// Resolves with one reply per node once all of them answered, or fails
    /// with [`TransportError::Timeout`] when `timeout` elapses first. Replies
    /// arriving after the deadline are discarded.
    fn survey(
        &self,
        op: &str,
        data: Bytes,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<SurveyReply>, TransportError>> + Send;

    /// Install the handler answering surveys on this node
    ///
    /// A node has exactly one handler; installing another replaces it.
    fn on_survey(&self, dispatcher: Arc<SurveyDispatcher>) -> impl Future<Output = ()> + Send;
}
