/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! HTTP transport

use crate::body::SdkBody;
use crate::error::BoxError;
use bytes::{BufMut, Bytes, BytesMut};
use http_body::Body;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tower::{Service, ServiceExt};

pub type ConnectorFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<Bytes>, BoxError>> + Send>>;

/// Sends a fully built HTTP request and returns the response with its body loaded into memory
pub trait Connector: Send + Sync + Debug {
    fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture;
}

pub type SharedConnector = Arc<dyn Connector>;

/// Adapts any cloneable `tower::Service`, eg. a `hyper::Client`, into a [`Connector`]
#[derive(Clone)]
pub struct ServiceConnector<S> {
    service: S,
}

impl<S> ServiceConnector<S> {
    pub fn new(service: S) -> Self {
        ServiceConnector { service }
    }
}

impl<S> Debug for ServiceConnector<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConnector")
            .field("service", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S, B> Connector for ServiceConnector<S>
where
    S: Service<http::Request<SdkBody>, Response = http::Response<B>>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture {
        let service = self.service.clone();
        Box::pin(async move {
            let response = service.oneshot(request).await.map_err(Into::into)?;
            let (parts, body) = response.into_parts();
            let body = read_body(body).await?;
            Ok(http::Response::from_parts(parts, body))
        })
    }
}

async fn read_body<B>(body: B) -> Result<Bytes, BoxError>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let mut body = Box::pin(body);
    let mut output = BytesMut::new();
    while let Some(chunk) = body.data().await {
        output.put(chunk.map_err(Into::into)?);
    }
    Ok(output.freeze())
}

#[cfg(feature = "rustls")]
pub type HttpsConnector = ServiceConnector<
    hyper::Client<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>, SdkBody>,
>;

/// Hyper client using rustls with the platform's native root certificates
#[cfg(feature = "rustls")]
pub fn https() -> HttpsConnector {
    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .https_or_http()
        .enable_http1()
        .build();
    ServiceConnector::new(hyper::Client::builder().build::<_, SdkBody>(https))
}
