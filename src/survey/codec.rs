//! Payload encoding
//!
//! Survey payloads are JSON records. Encode and decode failures map onto
//! distinct error variants so callers can tell which side broke.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Encode a record into a survey payload
pub fn encode<T: Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Error::Encode)
}

/// Decode a survey payload into a record
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(Error::Decode)
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::survey::message::{ManagedChannelsRequest, NumSubscribersRequest};

    #[test]
    fn test_requests_survive_transport() {
        let req = ManagedChannelsRequest { org_id: -42 };
        let decoded: ManagedChannelsRequest = assert_ok!(decode(&assert_ok!(encode(&req))));
        assert_eq!(decoded, req);

        let req = NumSubscribersRequest {
            channel: "1/stream/ünïcode".to_string(),
        };
        let decoded: NumSubscribersRequest = assert_ok!(decode(&assert_ok!(encode(&req))));
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_decode_garbage() {
        let err = assert_err!(decode::<ManagedChannelsRequest>(b"\x00\x01"));
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = assert_err!(decode::<ManagedChannelsRequest>(br#"{"channel":"a"}"#));
        assert!(matches!(err, Error::Decode(_)));
    }
}
