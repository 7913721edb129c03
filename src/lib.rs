//! Cluster-wide surveys for real-time pub/sub nodes
//!
//! A node broadcasts a typed request to every node of its cluster, each node
//! answers from its local channel registry, and the answers are merged into a
//! single result:
//!
//! - [`SurveyCaller::call_managed_channels`] lists the channels managed for an
//!   organization anywhere in the cluster, each channel once.
//! - [`SurveyCaller::call_num_subscribers`] sums a channel's subscribers over
//!   all nodes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use live_survey::{ChannelRegistry, LocalCluster, SurveyCaller, SurveyDispatcher};
//!
//! # async fn example() -> live_survey::error::Result<()> {
//! let cluster = LocalCluster::new();
//! let node = Arc::new(cluster.join("node-1").await);
//!
//! let registry = Arc::new(ChannelRegistry::new());
//! registry.subscribe(1, "stream/cpu").await?;
//!
//! let caller = SurveyCaller::new(Arc::clone(&node));
//! caller
//!     .setup_handlers(Arc::new(SurveyDispatcher::with_lookups(
//!         Arc::clone(&registry),
//!         registry,
//!     )))
//!     .await;
//!
//! let subscribers = caller.call_num_subscribers("stream/cpu").await?;
//! assert_eq!(subscribers, 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod registry;
pub mod stats;
pub mod survey;
pub mod transport;

pub use error::{Error, Result};
pub use registry::{ChannelLookup, ChannelRegistry, ManagedChannel, RegistryConfig, SubscriberLookup};
pub use survey::{SurveyCaller, SurveyConfig, SurveyDispatcher, SurveyOp, SurveyReply};
pub use transport::{LocalCluster, LocalNode, SurveyTransport, TransportError};
