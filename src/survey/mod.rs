//! Cluster-wide surveys
//!
//! A survey sends one typed request to every node of the cluster, waits for
//! each of them to answer within a deadline and folds the answers into one
//! result.
//!
//! # Flow
//!
//! ```text
//!   SurveyCaller::call_*()
//!          │ encode request
//!          ▼
//!   SurveyTransport::survey(op, data, timeout)
//!          │
//!          ├──────────────────────┬──────────────────────┐
//!          ▼                      ▼                      ▼
//!   [SurveyDispatcher]     [SurveyDispatcher]     [SurveyDispatcher]
//!    node A (local)          node B                 node C
//!    registry lookup         registry lookup        registry lookup
//!          │                      │                      │
//!          └──────────► Vec<SurveyReply> ◄───────────────┘
//!                             │
//!                             ▼
//!              fail fast on any non-zero code,
//!              dedupe channels / sum subscriber counts
//! ```
//!
//! The caller never returns a partial aggregate: a failed reply, an
//! undecodable payload, an empty batch or an elapsed deadline all fail the
//! whole call.

pub mod caller;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod message;
pub mod op;

pub use caller::SurveyCaller;
pub use config::SurveyConfig;
pub use dispatcher::SurveyDispatcher;
pub use message::{
    ManagedChannelsRequest, ManagedChannelsResponse, NumSubscribersRequest,
    NumSubscribersResponse, SurveyReply, CODE_FAILED, CODE_OK, MANAGED_STREAMS_OP,
    NUM_CHANNEL_SUBSCRIBERS_OP,
};
pub use op::{ManagedChannelsOp, NumSubscribersOp, SurveyOp};
