//! Survey caller configuration

use std::time::Duration;

/// Timeouts applied by [`SurveyCaller`](super::SurveyCaller)
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    /// Bound on the managed channel enumeration survey
    pub managed_channels_timeout: Duration,

    /// Bound on the subscriber count survey (runs on subscribe paths)
    pub num_subscribers_timeout: Duration,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            managed_channels_timeout: Duration::from_secs(1),
            num_subscribers_timeout: Duration::from_millis(500),
        }
    }
}

impl SurveyConfig {
    /// Set the managed channel enumeration timeout
    pub fn managed_channels_timeout(mut self, timeout: Duration) -> Self {
        self.managed_channels_timeout = timeout;
        self
    }

    /// Set the subscriber count timeout
    pub fn num_subscribers_timeout(mut self, timeout: Duration) -> Self {
        self.num_subscribers_timeout = timeout;
        self
    }
}
