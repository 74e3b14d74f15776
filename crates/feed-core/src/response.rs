use bytes::Bytes;
use reqwest::StatusCode;

use crate::errors::ClientError;

/// A response as handed over by the transport layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    status: StatusCode,
    payload: Bytes,
}

impl RawResponse {
    pub fn new(status: StatusCode, payload: impl Into<Bytes>) -> Self {
        Self {
            status,
            payload: payload.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

/// What the transport produced: a response, or the reason there is none.
pub type TransportOutcome = Result<RawResponse, ClientError>;
