//! Local channel registry
//!
//! The registry tracks the real-time channels this node currently manages and
//! how many local subscribers each of them has. Survey handlers only ever read
//! from it through the [`ChannelLookup`] and [`SubscriberLookup`] traits, so any
//! other registry can stand in for [`ChannelRegistry`].
//!
//! # Architecture
//!
//! ```text
//!                         Arc<ChannelRegistry>
//!                    ┌──────────────────────────┐
//!                    │ channels: HashMap<String,│
//!                    │   ChannelEntry {         │
//!                    │     org_id,              │
//!                    │     publisher_id,        │
//!                    │     subscriber_count,    │
//!                    │     last_data,           │
//!                    │   }                      │
//!                    │ >                        │
//!                    └────────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//!    [Publisher]            [Subscriber]          [Survey handler]
//!    publish()              subscribe()           managed_channels()
//!                                                 num_subscribers()
//! ```

pub mod channel;
pub mod config;
pub mod entry;
pub mod error;
pub mod lookup;
pub mod store;

pub use channel::ManagedChannel;
pub use config::RegistryConfig;
pub use entry::{ChannelEntry, ChannelState, ChannelStats};
pub use error::RegistryError;
pub use lookup::{ChannelLookup, SubscriberLookup};
pub use store::ChannelRegistry;
