//! Survey wire messages
//!
//! Request and response records exchanged between nodes, plus the per-node
//! reply envelope. Records are encoded field-named, so field names below are
//! part of the wire format.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::registry::ManagedChannel;

/// Operation listing the channels a node manages for an organization
pub const MANAGED_STREAMS_OP: &str = "managed_streams";

/// Operation counting a channel's local subscribers
pub const NUM_CHANNEL_SUBSCRIBERS_OP: &str = "num_channel_subscribers";

/// Status code of a successful reply
pub const CODE_OK: u32 = 0;

/// Status code of a failed reply
pub const CODE_FAILED: u32 = 1;

/// Request for [`MANAGED_STREAMS_OP`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedChannelsRequest {
    pub org_id: i64,
}

/// Response for [`MANAGED_STREAMS_OP`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedChannelsResponse {
    pub channels: Vec<ManagedChannel>,
}

/// Request for [`NUM_CHANNEL_SUBSCRIBERS_OP`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumSubscribersRequest {
    pub channel: String,
}

/// Response for [`NUM_CHANNEL_SUBSCRIBERS_OP`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumSubscribersResponse {
    pub num_subscribers: usize,
}

/// One node's answer to a survey
///
/// `data` is only meaningful when `code` is [`CODE_OK`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyReply {
    /// Status code, 0 on success
    pub code: u32,
    /// Encoded response payload
    pub data: Bytes,
}

impl SurveyReply {
    /// Create a successful reply carrying `data`
    pub fn ok(data: Bytes) -> Self {
        Self {
            code: CODE_OK,
            data,
        }
    }

    /// Create a failed reply with no payload
    pub fn failed() -> Self {
        Self {
            code: CODE_FAILED,
            data: Bytes::new(),
        }
    }

    /// Check if the reply reports success
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_field_names() {
        let req = ManagedChannelsRequest { org_id: 3 };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"orgId": 3}));

        let req = NumSubscribersRequest {
            channel: "stream/a".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"channel": "stream/a"})
        );
    }

    #[test]
    fn test_response_field_names() {
        let resp = NumSubscribersResponse { num_subscribers: 4 };
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"num_subscribers": 4})
        );

        let resp = ManagedChannelsResponse { channels: vec![] };
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"channels": []}));
    }

    #[test]
    fn test_failed_reply_has_no_payload() {
        let reply = SurveyReply::failed();
        assert_eq!(reply.code, CODE_FAILED);
        assert!(reply.data.is_empty());
        assert!(!reply.is_ok());
    }
}
