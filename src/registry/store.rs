//! Channel registry implementation
//!
//! The registry that records which channels this node serves, who publishes
//! on them and how many local subscribers they have.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use super::channel::ManagedChannel;
use super::config::RegistryConfig;
use super::entry::{ChannelEntry, ChannelState, ChannelStats};
use super::error::RegistryError;
use super::lookup::{ChannelLookup, SubscriberLookup};

/// Registry for all channels served by this node
///
/// Thread-safe via `RwLock`. Survey lookups only take read locks, so they run
/// concurrently with each other and with subscriber count checks.
pub struct ChannelRegistry {
    /// Map of channel identifier to channel entry
    channels: RwLock<HashMap<String, Arc<RwLock<ChannelEntry>>>>,

    /// Configuration
    config: RegistryConfig,
}

impl ChannelRegistry {
    /// Create a new channel registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new channel registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Lock the entry for a channel, creating it for `org_id` if missing
    ///
    /// The entry lock is taken while the map lock is still held, so `cleanup`
    /// can never remove an entry between lookup and mutation.
    async fn lock_entry(
        &self,
        org_id: i64,
        channel: &str,
    ) -> Result<OwnedRwLockWriteGuard<ChannelEntry>, RegistryError> {
        let mut channels = self.channels.write().await;

        if let Some(entry_arc) = channels.get(channel) {
            let entry = Arc::clone(entry_arc).write_owned().await;
            if entry.org_id != org_id {
                return Err(RegistryError::OrgMismatch {
                    channel: channel.to_string(),
                    owner: entry.org_id,
                    requested: org_id,
                });
            }
            return Ok(entry);
        }

        let entry_arc = Arc::new(RwLock::new(ChannelEntry::new(org_id)));
        let entry = Arc::clone(&entry_arc).write_owned().await;
        channels.insert(channel.to_string(), entry_arc);

        tracing::info!(channel = %channel, org_id = org_id, "Channel created");

        Ok(entry)
    }

    /// Register a publisher for a channel
    ///
    /// If the channel doesn't exist, it will be created.
    /// Returns an error if the channel already has a publisher.
    pub async fn register_publisher(
        &self,
        org_id: i64,
        channel: &str,
        session_id: u64,
    ) -> Result<(), RegistryError> {
        let mut entry = self.lock_entry(org_id, channel).await?;

        if entry.has_publisher() {
            return Err(RegistryError::ChannelAlreadyPublishing(channel.to_string()));
        }

        entry.publisher_id = Some(session_id);
        entry.refresh_state();

        tracing::info!(
            channel = %channel,
            session_id = session_id,
            subscribers = entry.subscriber_count(),
            "Publisher registered"
        );

        Ok(())
    }

    /// Unregister a publisher from a channel
    pub async fn unregister_publisher(&self, channel: &str, session_id: u64) {
        let channels = self.channels.read().await;

        if let Some(entry_arc) = channels.get(channel) {
            let mut entry = entry_arc.write().await;

            if entry.publisher_id != Some(session_id) {
                tracing::warn!(
                    channel = %channel,
                    expected = ?entry.publisher_id,
                    actual = session_id,
                    "Publisher unregister mismatch"
                );
                return;
            }

            entry.publisher_id = None;
            entry.refresh_state();

            tracing::info!(
                channel = %channel,
                session_id = session_id,
                subscribers = entry.subscriber_count(),
                "Publisher unregistered"
            );
        }
    }

    /// Subscribe to a channel
    ///
    /// Subscribing to an unknown channel creates it, so subscribers may
    /// arrive before the publisher does.
    pub async fn subscribe(&self, org_id: i64, channel: &str) -> Result<(), RegistryError> {
        let mut entry = self.lock_entry(org_id, channel).await?;

        entry.subscriber_count.fetch_add(1, Ordering::Relaxed);
        entry.refresh_state();

        tracing::debug!(
            channel = %channel,
            subscribers = entry.subscriber_count(),
            "Subscriber added"
        );

        Ok(())
    }

    /// Unsubscribe from a channel
    pub async fn unsubscribe(&self, channel: &str) {
        let channels = self.channels.read().await;

        if let Some(entry_arc) = channels.get(channel) {
            let mut entry = entry_arc.write().await;
            let _ = entry
                .subscriber_count
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
            entry.refresh_state();

            tracing::debug!(
                channel = %channel,
                subscribers = entry.subscriber_count(),
                "Subscriber removed"
            );
        }
    }

    /// Record a message published on a channel
    pub async fn publish(
        &self,
        channel: &str,
        data: serde_json::Value,
    ) -> Result<(), RegistryError> {
        let channels = self.channels.read().await;

        let entry_arc = channels
            .get(channel)
            .ok_or_else(|| RegistryError::ChannelNotFound(channel.to_string()))?;

        entry_arc
            .write()
            .await
            .record_publish(data, self.config.rate_window);

        Ok(())
    }

    /// Snapshot all active channels owned by `org_id`, sorted by channel
    pub async fn list_managed(&self, org_id: i64) -> Vec<ManagedChannel> {
        let channels = self.channels.read().await;
        let mut managed = Vec::new();

        for (channel, entry_arc) in channels.iter() {
            let entry = entry_arc.read().await;
            if entry.org_id == org_id && entry.state == ChannelState::Active {
                managed.push(entry.snapshot(channel, self.config.rate_window));
            }
        }

        managed.sort_by(|a, b| a.channel.cmp(&b.channel));
        managed
    }

    /// Get the local subscriber count of a channel
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        let channels = self.channels.read().await;

        match channels.get(channel) {
            Some(entry_arc) => entry_arc.read().await.subscriber_count() as usize,
            None => 0,
        }
    }

    /// Get channel statistics
    pub async fn channel_stats(&self, channel: &str) -> Option<ChannelStats> {
        let channels = self.channels.read().await;

        if let Some(entry_arc) = channels.get(channel) {
            let entry = entry_arc.read().await;
            Some(ChannelStats {
                org_id: entry.org_id,
                subscriber_count: entry.subscriber_count(),
                has_publisher: entry.has_publisher(),
                state: entry.state,
                minute_rate: entry.rate(self.config.rate_window),
            })
        } else {
            None
        }
    }

    /// Get total number of channels
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Run cleanup task once
    ///
    /// Removes channels that have been idle longer than `idle_channel_timeout`.
    pub async fn cleanup(&self) {
        let mut channels = self.channels.write().await;
        let now = Instant::now();

        let to_remove: Vec<String> = channels
            .iter()
            .filter_map(|(channel, entry_arc)| {
                // Skip entries that are busy right now
                let entry = entry_arc.try_read().ok()?;
                let expired = entry.state == ChannelState::Idle
                    && entry.idle_since.is_some_and(|since| {
                        now.duration_since(since) > self.config.idle_channel_timeout
                    });

                expired.then(|| channel.clone())
            })
            .collect();

        for channel in to_remove {
            channels.remove(&channel);
            tracing::info!(channel = %channel, "Channel removed by cleanup");
        }
    }

    /// Spawn background cleanup task
    ///
    /// Returns a handle that can be used to abort the task.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let registry = Arc::clone(self);
        let interval = registry.config.cleanup_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                registry.cleanup().await;
            }
        })
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelLookup for ChannelRegistry {
    async fn managed_channels(&self, org_id: i64) -> Result<Vec<ManagedChannel>, RegistryError> {
        Ok(self.list_managed(org_id).await)
    }
}

impl SubscriberLookup for ChannelRegistry {
    async fn num_subscribers(&self, channel: &str) -> usize {
        self.subscriber_count(channel).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_register_publisher() {
        let registry = ChannelRegistry::new();

        registry.register_publisher(1, "stream/a", 1).await.unwrap();
        let stats = registry.channel_stats("stream/a").await.unwrap();
        assert!(stats.has_publisher);
        assert_eq!(stats.state, ChannelState::Active);

        // Can't register another publisher
        let result = registry.register_publisher(1, "stream/a", 2).await;
        assert!(matches!(
            result,
            Err(RegistryError::ChannelAlreadyPublishing(_))
        ));
    }

    #[tokio::test]
    async fn test_org_mismatch() {
        let registry = ChannelRegistry::new();

        registry.register_publisher(1, "stream/a", 1).await.unwrap();
        let result = registry.subscribe(2, "stream/a").await;
        assert_eq!(
            result,
            Err(RegistryError::OrgMismatch {
                channel: "stream/a".to_string(),
                owner: 1,
                requested: 2,
            })
        );
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let registry = ChannelRegistry::new();

        registry.subscribe(1, "stream/a").await.unwrap();
        registry.subscribe(1, "stream/a").await.unwrap();
        assert_eq!(registry.num_subscribers("stream/a").await, 2);

        registry.unsubscribe("stream/a").await;
        registry.unsubscribe("stream/a").await;
        // Extra unsubscribe must not wrap around
        registry.unsubscribe("stream/a").await;

        let stats = registry.channel_stats("stream/a").await.unwrap();
        assert_eq!(stats.subscriber_count, 0);
        assert_eq!(stats.state, ChannelState::Idle);
    }

    #[tokio::test]
    async fn test_unknown_channel_has_no_subscribers() {
        let registry = ChannelRegistry::new();
        assert_eq!(registry.num_subscribers("nope").await, 0);
    }

    #[tokio::test]
    async fn test_publish_requires_channel() {
        let registry = ChannelRegistry::new();

        let result = registry.publish("stream/a", json!(1)).await;
        assert_eq!(
            result,
            Err(RegistryError::ChannelNotFound("stream/a".to_string()))
        );
    }

    #[tokio::test]
    async fn test_managed_channels_filters_org_and_state() {
        let registry = ChannelRegistry::new();

        registry.register_publisher(1, "stream/b", 1).await.unwrap();
        registry.subscribe(1, "stream/a").await.unwrap();
        registry.register_publisher(2, "stream/c", 2).await.unwrap();
        registry.subscribe(1, "stream/idle").await.unwrap();
        registry.unsubscribe("stream/idle").await;

        registry.publish("stream/b", json!({"v": 1})).await.unwrap();

        let channels = registry.managed_channels(1).await.unwrap();
        let names: Vec<&str> = channels.iter().map(|c| c.channel.as_str()).collect();
        assert_eq!(names, vec!["stream/a", "stream/b"]);
        assert_eq!(channels[1].minute_rate, 1);
        assert_eq!(channels[1].data, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_unregister_publisher_mismatch() {
        let registry = ChannelRegistry::new();

        registry.register_publisher(1, "stream/a", 1).await.unwrap();
        registry.unregister_publisher("stream/a", 7).await;
        assert!(registry.channel_stats("stream/a").await.unwrap().has_publisher);

        registry.unregister_publisher("stream/a", 1).await;
        let stats = registry.channel_stats("stream/a").await.unwrap();
        assert!(!stats.has_publisher);
        assert_eq!(stats.state, ChannelState::Idle);
    }

    #[tokio::test]
    async fn test_cleanup_removes_idle_channels() {
        let config = RegistryConfig::default().idle_channel_timeout(Duration::from_millis(20));
        let registry = ChannelRegistry::with_config(config);

        registry.register_publisher(1, "stream/a", 1).await.unwrap();
        registry.register_publisher(1, "stream/b", 2).await.unwrap();
        registry.unregister_publisher("stream/b", 2).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        registry.cleanup().await;

        assert_eq!(registry.channel_count().await, 1);
        assert!(registry.channel_stats("stream/a").await.is_some());
        assert!(registry.channel_stats("stream/b").await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscribe_survives_concurrent_cleanup() {
        let config = RegistryConfig::default().idle_channel_timeout(Duration::ZERO);
        let registry = Arc::new(ChannelRegistry::with_config(config));

        let cleaners: Vec<_> = (0..3)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    loop {
                        registry.cleanup().await;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        let mut lost = 0;
        for i in 0..20_000 {
            let channel = format!("stream/{}", i % 16);
            registry.subscribe(1, &channel).await.unwrap();
            if registry.num_subscribers(&channel).await != 1 {
                lost += 1;
            }
            registry.unsubscribe(&channel).await;
        }

        for cleaner in cleaners {
            cleaner.abort();
        }

        assert_eq!(lost, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_publisher_survives_concurrent_cleanup() {
        let config = RegistryConfig::default().idle_channel_timeout(Duration::ZERO);
        let registry = Arc::new(ChannelRegistry::with_config(config));

        let cleaner = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                loop {
                    registry.cleanup().await;
                    tokio::task::yield_now().await;
                }
            })
        };

        for i in 0..5_000u64 {
            let channel = format!("stream/{}", i % 8);
            registry.register_publisher(1, &channel, i).await.unwrap();
            let stats = registry.channel_stats(&channel).await;
            assert!(stats.is_some_and(|s| s.has_publisher));
            registry.unregister_publisher(&channel, i).await;
        }

        cleaner.abort();
    }
}
