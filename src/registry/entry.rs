//! Channel entry and state types
//!
//! This module defines the per-channel state stored in the registry.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use super::channel::ManagedChannel;

/// State of a channel entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// Channel has a publisher or at least one subscriber
    Active,
    /// Nobody uses the channel, waiting for cleanup
    Idle,
}

/// Entry for a single channel in the registry
pub struct ChannelEntry {
    /// Organization owning the channel
    pub org_id: i64,

    /// Current publisher's session ID (None if no publisher)
    pub publisher_id: Option<u64>,

    /// Number of active local subscribers
    pub subscriber_count: AtomicU32,

    /// Last payload published on the channel
    pub last_data: Option<serde_json::Value>,

    /// Publish instants inside the current rate window
    publish_times: VecDeque<Instant>,

    /// When the channel last became idle
    pub idle_since: Option<Instant>,

    /// Current channel state
    pub state: ChannelState,
}

impl ChannelEntry {
    /// Create a new, idle channel entry
    pub(super) fn new(org_id: i64) -> Self {
        Self {
            org_id,
            publisher_id: None,
            subscriber_count: AtomicU32::new(0),
            last_data: None,
            publish_times: VecDeque::new(),
            idle_since: Some(Instant::now()),
            state: ChannelState::Idle,
        }
    }

    /// Get the number of subscribers
    pub fn subscriber_count(&self) -> u32 {
        self.subscriber_count.load(Ordering::Relaxed)
    }

    /// Check if the channel has an active publisher
    pub fn has_publisher(&self) -> bool {
        self.publisher_id.is_some()
    }

    /// Recompute the state after a publisher or subscriber change
    pub(super) fn refresh_state(&mut self) {
        if self.has_publisher() || self.subscriber_count() > 0 {
            self.state = ChannelState::Active;
            self.idle_since = None;
        } else if self.state == ChannelState::Active {
            self.state = ChannelState::Idle;
            self.idle_since = Some(Instant::now());
        }
    }

    /// Record a published payload
    pub(super) fn record_publish(&mut self, data: serde_json::Value, window: Duration) {
        let now = Instant::now();
        self.prune(now, window);
        self.publish_times.push_back(now);
        self.last_data = Some(data);
    }

    /// Number of publishes inside the rate window ending now
    pub fn rate(&self, window: Duration) -> i64 {
        let now = Instant::now();
        self.publish_times
            .iter()
            .filter(|t| now.duration_since(**t) <= window)
            .count() as i64
    }

    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.publish_times.front() {
            if now.duration_since(*oldest) > window {
                self.publish_times.pop_front();
            } else {
                break;
            }
        }
    }

    /// Snapshot this entry as a managed channel
    pub fn snapshot(&self, channel: &str, window: Duration) -> ManagedChannel {
        ManagedChannel {
            channel: channel.to_string(),
            minute_rate: self.rate(window),
            data: self.last_data.clone().unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Statistics for a channel
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Organization owning the channel
    pub org_id: i64,
    /// Number of active subscribers
    pub subscriber_count: u32,
    /// Whether the channel has an active publisher
    pub has_publisher: bool,
    /// Current channel state
    pub state: ChannelState,
    /// Publishes inside the rate window
    pub minute_rate: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_entry_is_idle() {
        let entry = ChannelEntry::new(1);

        assert_eq!(entry.state, ChannelState::Idle);
        assert!(entry.idle_since.is_some());
        assert!(!entry.has_publisher());
        assert_eq!(entry.subscriber_count(), 0);
    }

    #[test]
    fn test_refresh_state_transitions() {
        let mut entry = ChannelEntry::new(1);

        entry.subscriber_count.fetch_add(1, Ordering::Relaxed);
        entry.refresh_state();
        assert_eq!(entry.state, ChannelState::Active);
        assert!(entry.idle_since.is_none());

        entry.subscriber_count.fetch_sub(1, Ordering::Relaxed);
        entry.refresh_state();
        assert_eq!(entry.state, ChannelState::Idle);
        assert!(entry.idle_since.is_some());
    }

    #[test]
    fn test_rate_counts_publishes_in_window() {
        let mut entry = ChannelEntry::new(1);
        let window = Duration::from_secs(60);

        entry.record_publish(json!(1), window);
        entry.record_publish(json!(2), window);
        entry.record_publish(json!(3), window);

        assert_eq!(entry.rate(window), 3);
        assert_eq!(entry.last_data, Some(json!(3)));
    }

    #[test]
    fn test_snapshot() {
        let mut entry = ChannelEntry::new(1);
        let window = Duration::from_secs(60);

        let empty = entry.snapshot("a/b", window);
        assert_eq!(empty, ManagedChannel::new("a/b"));

        entry.record_publish(json!({"cpu": 0.5}), window);
        let snapshot = entry.snapshot("a/b", window);
        assert_eq!(snapshot.minute_rate, 1);
        assert_eq!(snapshot.data, json!({"cpu": 0.5}));
    }
}
