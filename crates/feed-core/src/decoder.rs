//! Turns transport outcomes into typed results.
//!
//! Parsing happens on the caller's context. Delivery never does: every
//! result, success or failure, is dispatched onto the decoder's
//! [`CallbackContext`] and handed to the continuation exactly once. The
//! `status`/`value`/`envelope` variants wrap the same dispatch in a
//! [`Delivery`] future for async callers.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::context::CallbackContext;
use crate::envelope::DecodedEnvelope;
use crate::errors::{ClientError, ClientResult, classify};
use crate::response::TransportOutcome;

pub fn parse_status(outcome: TransportOutcome) -> ClientResult<StatusCode> {
    outcome
        .map(|response| response.status())
        .map_err(|error| classify(error, None))
}

pub fn parse_value<T: DeserializeOwned>(outcome: TransportOutcome) -> ClientResult<T> {
    let response = outcome.map_err(|error| classify(error, None))?;
    tracing::debug!(
        status = %response.status(),
        payload_len = response.payload().len(),
        target_type = std::any::type_name::<T>(),
        "decoding response"
    );
    serde_json::from_slice(response.payload()).map_err(|error| classify(error, Some(&response)))
}

pub fn parse_envelope<T: DeserializeOwned>(
    outcome: TransportOutcome,
) -> ClientResult<DecodedEnvelope<T>> {
    parse_value::<DecodedEnvelope<T>>(outcome).map(DecodedEnvelope::normalized)
}

#[derive(Clone, Debug)]
pub struct ResponseDecoder<C> {
    context: C,
}

impl<C> ResponseDecoder<C>
where
    C: CallbackContext,
{
    pub fn new(context: C) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn decode_status<F>(&self, outcome: TransportOutcome, completion: F)
    where
        F: FnOnce(ClientResult<StatusCode>) + Send + 'static,
    {
        self.deliver(parse_status(outcome), completion);
    }

    pub fn decode_value<T, F>(&self, outcome: TransportOutcome, completion: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(ClientResult<T>) + Send + 'static,
    {
        self.deliver(parse_value::<T>(outcome), completion);
    }

    pub fn decode_envelope<T, F>(&self, outcome: TransportOutcome, completion: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(ClientResult<DecodedEnvelope<T>>) + Send + 'static,
    {
        self.deliver(parse_envelope::<T>(outcome), completion);
    }

    pub fn status(&self, outcome: TransportOutcome) -> Delivery<StatusCode> {
        self.deliver_later(parse_status(outcome))
    }

    pub fn value<T>(&self, outcome: TransportOutcome) -> Delivery<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.deliver_later(parse_value::<T>(outcome))
    }

    pub fn envelope<T>(&self, outcome: TransportOutcome) -> Delivery<DecodedEnvelope<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.deliver_later(parse_envelope::<T>(outcome))
    }

    fn deliver<T, F>(&self, result: ClientResult<T>, completion: F)
    where
        T: Send + 'static,
        F: FnOnce(ClientResult<T>) + Send + 'static,
    {
        self.context.dispatch(Box::new(move || completion(result)));
    }

    fn deliver_later<T>(&self, result: ClientResult<T>) -> Delivery<T>
    where
        T: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        self.deliver(result, move |result| {
            // The awaiting side may have given up; nothing left to notify.
            let _ = sender.send(result);
        });
        Delivery { receiver }
    }
}

/// Future resolving to a decode result once the callback context has run
/// the delivery job.
#[derive(Debug)]
#[must_use = "a delivery does nothing unless awaited"]
pub struct Delivery<T> {
    receiver: oneshot::Receiver<ClientResult<T>>,
}

impl<T> Future for Delivery<T> {
    type Output = ClientResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.poll_unpin(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(canceled)) => Poll::Ready(Err(ClientError::Unknown {
                message: "callback context dropped the result before delivery".to_string(),
                source: Box::new(canceled),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
