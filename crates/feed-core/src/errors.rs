//! Client error taxonomy and the classifier that maps decode-time failures
//! onto it.

use bytes::Bytes;
use serde_json::error::Category;
use thiserror::Error;

use crate::response::RawResponse;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure a decode operation can report.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The response could not be obtained at all.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// Bytes were obtained but did not match the expected schema. `payload`
    /// is empty when no response was ever received.
    #[error("response decode failed: {message}")]
    Decode {
        message: String,
        #[source]
        source: serde_json::Error,
        payload: Bytes,
    },

    #[error("unexpected failure: {message}")]
    Unknown {
        message: String,
        #[source]
        source: BoxError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    Transport,
    Decode,
    Unknown,
}

impl ClientError {
    pub fn transport(error: impl Into<BoxError>) -> Self {
        Self::Transport(error.into())
    }

    pub fn unknown(error: impl Into<BoxError>) -> Self {
        let source = error.into();
        Self::Unknown {
            message: source.to_string(),
            source,
        }
    }

    pub fn kind(&self) -> ClientErrorKind {
        match self {
            Self::Transport(_) => ClientErrorKind::Transport,
            Self::Decode { .. } => ClientErrorKind::Decode,
            Self::Unknown { .. } => ClientErrorKind::Unknown,
        }
    }

    /// Raw bytes attached to a decode failure.
    pub fn raw_payload(&self) -> Option<&Bytes> {
        match self {
            Self::Decode { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A failure raised while turning a response into a typed value, before it
/// has been classified.
#[derive(Debug)]
pub enum DecodeFailure {
    Client(ClientError),
    Schema(serde_json::Error),
    Other(BoxError),
}

impl From<ClientError> for DecodeFailure {
    fn from(error: ClientError) -> Self {
        Self::Client(error)
    }
}

impl From<serde_json::Error> for DecodeFailure {
    fn from(error: serde_json::Error) -> Self {
        Self::Schema(error)
    }
}

impl From<BoxError> for DecodeFailure {
    fn from(error: BoxError) -> Self {
        Self::Other(error)
    }
}

/// Maps a failure onto exactly one [`ClientError`].
///
/// `response` is the response the failure was raised against, if one was
/// obtained; its bytes become the diagnostic payload of a decode error.
pub fn classify(failure: impl Into<DecodeFailure>, response: Option<&RawResponse>) -> ClientError {
    match failure.into() {
        DecodeFailure::Client(error) => error,
        DecodeFailure::Schema(error) if error.classify() != Category::Io => {
            let payload = response
                .map(|response| response.payload().clone())
                .unwrap_or_default();
            tracing::warn!(
                line = error.line(),
                column = error.column(),
                payload_len = payload.len(),
                "response payload did not match expected schema"
            );
            ClientError::Decode {
                message: error.to_string(),
                source: error,
                payload,
            }
        }
        DecodeFailure::Schema(error) => {
            tracing::debug!(%error, "i/o failure while decoding response");
            ClientError::unknown(error)
        }
        DecodeFailure::Other(error) => {
            tracing::debug!(%error, "unclassified failure while decoding response");
            ClientError::Unknown {
                message: error.to_string(),
                source: error,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::io;

    struct BrokenReader;

    impl io::Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream reset"))
        }
    }

    fn schema_error() -> serde_json::Error {
        serde_json::from_slice::<u32>(b"\"not a number\"").expect_err("type mismatch")
    }

    #[test]
    fn classify_passes_client_errors_through_unchanged() {
        let original = ClientError::transport(io::Error::other("connection refused"));
        let classified = classify(original, None);
        assert_eq!(classified.kind(), ClientErrorKind::Transport);
        assert!(classified.to_string().contains("connection refused"));
    }

    #[test]
    fn classify_schema_error_keeps_response_bytes() {
        let response = RawResponse::new(StatusCode::OK, "\"not a number\"");
        let classified = classify(schema_error(), Some(&response));
        assert_eq!(classified.kind(), ClientErrorKind::Decode);
        assert_eq!(
            classified.raw_payload().map(|bytes| bytes.as_ref()),
            Some(b"\"not a number\"".as_slice())
        );
    }

    #[test]
    fn classify_schema_error_without_response_has_empty_payload() {
        let classified = classify(schema_error(), None);
        let payload = classified.raw_payload().expect("decode error carries payload");
        assert!(payload.is_empty());
    }

    #[test]
    fn classify_io_category_is_unknown() {
        let error = serde_json::from_reader::<_, u32>(BrokenReader).expect_err("reader fails");
        let classified = classify(error, None);
        assert_eq!(classified.kind(), ClientErrorKind::Unknown);
        assert!(classified.raw_payload().is_none());
    }

    #[test]
    fn classify_other_failures_are_unknown_with_message() {
        let error: BoxError = "worker panicked".into();
        let classified = classify(error, None);
        match classified {
            ClientError::Unknown { message, .. } => assert_eq!(message, "worker panicked"),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn classify_is_idempotent() {
        let response = RawResponse::new(StatusCode::OK, "[]");
        let once = classify(schema_error(), Some(&response));
        let twice = classify(once, None);
        assert_eq!(twice.kind(), ClientErrorKind::Decode);
        assert_eq!(twice.raw_payload().map(|bytes| bytes.len()), Some(2));
    }
}
