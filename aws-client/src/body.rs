/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::error::BoxError;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue};
use http_body::SizeHint;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Body of an outgoing request
///
/// JSON RPC payloads are always held in memory: the signer needs the full body to compute the
/// payload hash, and retries resend the same bytes. Cloning an `SdkBody` is cheap.
#[derive(Debug, Clone, Default)]
pub struct SdkBody(Option<Bytes>);

impl SdkBody {
    pub fn empty() -> Self {
        SdkBody(Some(Bytes::new()))
    }

    /// The contents of this body, or `None` once it has been polled to completion.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.0.as_deref()
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map(Bytes::len).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for SdkBody {
    fn from(s: &str) -> Self {
        SdkBody(Some(Bytes::copy_from_slice(s.as_bytes())))
    }
}

impl From<String> for SdkBody {
    fn from(s: String) -> Self {
        SdkBody(Some(Bytes::from(s)))
    }
}

impl From<Bytes> for SdkBody {
    fn from(bytes: Bytes) -> Self {
        SdkBody(Some(bytes))
    }
}

impl From<Vec<u8>> for SdkBody {
    fn from(data: Vec<u8>) -> Self {
        Self::from(Bytes::from(data))
    }
}

impl http_body::Body for SdkBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_data(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        match self.0.take() {
            Some(bytes) if !bytes.is_empty() => Poll::Ready(Some(Ok(bytes))),
            _ => Poll::Ready(None),
        }
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<Option<HeaderMap<HeaderValue>>, Self::Error>> {
        Poll::Ready(Ok(None))
    }

    fn is_end_stream(&self) -> bool {
        self.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.len() as u64)
    }
}

#[cfg(test)]
mod test {
    use super::SdkBody;
    use http_body::Body;

    #[tokio::test]
    async fn body_is_yielded_once() {
        let mut body = SdkBody::from("hello");
        assert_eq!(body.size_hint().exact(), Some(5));
        let chunk = body.data().await.expect("one chunk").expect("no error");
        assert_eq!(&chunk[..], b"hello");
        assert!(body.data().await.is_none());
        assert!(body.is_end_stream());
        assert_eq!(body.bytes(), None);
    }

    #[tokio::test]
    async fn empty_body_yields_nothing() {
        let mut body = SdkBody::empty();
        assert!(body.is_end_stream());
        assert!(body.data().await.is_none());
    }

    #[test]
    fn clones_share_contents() {
        let body = SdkBody::from(vec![1_u8, 2, 3]);
        let cloned = body.clone();
        assert_eq!(cloned.bytes(), Some(&[1_u8, 2, 3][..]));
        assert_eq!(body.len(), 3);
    }
}
