//! Managed channel snapshot
//!
//! The value a node reports for each channel it actively serves. Surveys carry
//! these across the cluster, so the type is serializable and the channel
//! identifier is the identity used when merging reports from several nodes.

use serde::{Deserialize, Serialize};

/// A real-time channel actively served by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedChannel {
    /// Unique channel identifier (e.g., "stream/telemetry/cpu")
    pub channel: String,

    /// Messages published on the channel during the last rate window
    #[serde(default)]
    pub minute_rate: i64,

    /// Last payload published on the channel
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ManagedChannel {
    /// Create a channel snapshot with no rate or data
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            minute_rate: 0,
            data: serde_json::Value::Null,
        }
    }

    /// Set the per-minute message rate
    pub fn with_minute_rate(mut self, rate: i64) -> Self {
        self.minute_rate = rate;
        self
    }

    /// Set the last published payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_missing_fields_default() {
        let channel: ManagedChannel = serde_json::from_str(r#"{"channel":"a/b"}"#).unwrap();

        assert_eq!(channel, ManagedChannel::new("a/b"));
        assert!(channel.data.is_null());
    }

    #[test]
    fn test_serialized_field_names() {
        let channel = ManagedChannel::new("a/b")
            .with_minute_rate(12)
            .with_data(json!({"value": 1}));

        let encoded = serde_json::to_value(&channel).unwrap();
        assert_eq!(
            encoded,
            json!({"channel": "a/b", "minute_rate": 12, "data": {"value": 1}})
        );
    }
}
