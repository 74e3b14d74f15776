//! The transport seam: where raw responses come from.

use async_trait::async_trait;

use crate::config::FeedConfig;
use crate::errors::ClientError;
use crate::response::{RawResponse, TransportOutcome};

/// Produces raw responses for API paths. Implementations never interpret the
/// body; a non-success status is still a response.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    async fn fetch(&self, path: &str) -> TransportOutcome;
}

#[async_trait]
impl<T> ResponseSource for std::sync::Arc<T>
where
    T: ResponseSource + ?Sized,
{
    async fn fetch(&self, path: &str) -> TransportOutcome {
        (**self).fetch(path).await
    }
}

#[derive(Clone, Debug)]
pub struct ReqwestSource {
    client: reqwest::Client,
    config: FeedConfig,
}

impl ReqwestSource {
    pub fn new(config: FeedConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ClientError::transport)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }
}

#[async_trait]
impl ResponseSource for ReqwestSource {
    async fn fetch(&self, path: &str) -> TransportOutcome {
        let url = self.config.endpoint(path);
        tracing::debug!(%url, "fetching");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ClientError::transport)?;
        let status = response.status();
        let payload = response.bytes().await.map_err(ClientError::transport)?;
        tracing::debug!(%url, %status, payload_len = payload.len(), "response received");
        Ok(RawResponse::new(status, payload))
    }
}
