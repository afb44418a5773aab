//! Delivery results and the resolution stream

use crate::types::ResolutionStatus;
use futures_util::Stream;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Status line and headers of the raw transport response, when one
/// arrived. The body is carried separately in [`Delivery::payload`].
#[derive(Debug, Clone)]
pub struct ResponseParts {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

/// One result delivery from a resolution.
///
/// Every field other than `status` may be absent: an offline resolution
/// with no cache entry delivers all-`None` fields with the
/// `NoNetworkAvailable` sentinel.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Response or cached bytes, when any source produced them.
    pub payload: Option<Vec<u8>>,
    /// Effective URL of the fetch, when the address was parseable.
    pub url: Option<reqwest::Url>,
    /// Raw response parts, only present when the network was reached.
    pub response: Option<ResponseParts>,
    pub status: ResolutionStatus,
}

impl Delivery {
    /// Decode the payload as JSON.
    ///
    /// Returns `None` when there is no payload or the bytes do not match
    /// `T`; the raw payload stays in place for the caller to inspect.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        let bytes = self.payload.as_deref()?;
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(status = %self.status, %error, "payload did not match expected shape");
                None
            }
        }
    }

    /// True when the payload came out of the cache store.
    pub fn served_from_cache(&self) -> bool {
        self.status.served_from_cache()
    }
}

/// Stream of deliveries for one resolution.
///
/// Yields at most two items: an optional prepopulation delivery followed
/// by exactly one terminal delivery, in that order. Dropping the stream
/// abandons the deliveries but never the side effects; cache write-back
/// and queue persistence run to completion regardless.
#[derive(Debug)]
pub struct Resolution {
    inner: ReceiverStream<Delivery>,
}

impl Resolution {
    /// Capacity 2 holds prepopulation plus terminal, so the resolution
    /// task never blocks on an unread receiver.
    pub(crate) fn channel() -> (mpsc::Sender<Delivery>, Resolution) {
        let (tx, rx) = mpsc::channel(2);
        let resolution = Resolution {
            inner: ReceiverStream::new(rx),
        };
        (tx, resolution)
    }

    /// Next delivery, or `None` once the resolution has finished.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        use futures_util::StreamExt;
        self.inner.next().await
    }

    /// Drain the stream and return the terminal delivery.
    pub async fn final_delivery(mut self) -> Option<Delivery> {
        let mut last = None;
        while let Some(delivery) = self.next_delivery().await {
            last = Some(delivery);
        }
        last
    }
}

impl Stream for Resolution {
    type Item = Delivery;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
