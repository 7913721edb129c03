//! Registry configuration

use std::time::Duration;

/// Channel registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a channel with no publisher and no subscribers is kept
    pub idle_channel_timeout: Duration,

    /// Interval between cleanup runs
    pub cleanup_interval: Duration,

    /// Window used to compute a channel's message rate
    pub rate_window: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_channel_timeout: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(10),
            rate_window: Duration::from_secs(60),
        }
    }
}

impl RegistryConfig {
    /// Set the idle channel timeout
    pub fn idle_channel_timeout(mut self, timeout: Duration) -> Self {
        self.idle_channel_timeout = timeout;
        self
    }

    /// Set the cleanup interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the rate window
    pub fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = window;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();

        assert_eq!(config.idle_channel_timeout, Duration::from_secs(30));
        assert_eq!(config.cleanup_interval, Duration::from_secs(10));
        assert_eq!(config.rate_window, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_chaining() {
        let config = RegistryConfig::default()
            .idle_channel_timeout(Duration::from_secs(5))
            .cleanup_interval(Duration::from_secs(1))
            .rate_window(Duration::from_secs(10));

        assert_eq!(config.idle_channel_timeout, Duration::from_secs(5));
        assert_eq!(config.cleanup_interval, Duration::from_secs(1));
        assert_eq!(config.rate_window, Duration::from_secs(10));
    }
}
