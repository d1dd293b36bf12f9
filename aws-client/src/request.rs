/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::body::SdkBody;
use crate::client::ClientInfo;
use crate::config::Config;
use crate::error::SdkError;
use crate::handlers::Handlers;
use crate::operation::Operation;
use crate::retry::{DefaultRetryer, Retryer, DEFAULT_MAX_RETRIES};
use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::SystemTime;

/// State of a single API call as it moves through the handler phases
///
/// A request owns a private copy of its client's handlers: customising them affects this call
/// only. Configuration and client info are shared, read-only.
#[derive(Debug)]
pub struct Request {
    config: Arc<Config>,
    info: Arc<ClientInfo>,
    handlers: Handlers,
    retryer: Arc<dyn Retryer>,
    operation: Operation,
    params: serde_json::Value,
    http_request: http::Request<SdkBody>,
    http_response: Option<http::Response<Bytes>>,
    data: Option<serde_json::Value>,
    error: Option<SdkError>,
    request_id: Option<String>,
    retry_count: u32,
    time: SystemTime,
    construction_error: Option<SdkError>,
}

impl Request {
    pub fn new(
        config: Arc<Config>,
        info: Arc<ClientInfo>,
        handlers: Handlers,
        operation: Operation,
        params: serde_json::Value,
    ) -> Self {
        let uri = format!(
            "{}{}",
            info.endpoint.as_deref().unwrap_or_default().trim_end_matches('/'),
            operation.http_path()
        );
        let (http_request, construction_error) = match http::Request::builder()
            .method(operation.http_method().clone())
            .uri(uri)
            .body(SdkBody::empty())
        {
            Ok(request) => (request, None),
            Err(err) => (
                http::Request::new(SdkBody::empty()),
                Some(SdkError::construction_failure(err)),
            ),
        };
        let retryer = DefaultRetryer::new(config.max_retries().unwrap_or(DEFAULT_MAX_RETRIES));
        Request {
            config,
            info,
            handlers,
            retryer: Arc::new(retryer),
            operation,
            params,
            http_request,
            http_response: None,
            data: None,
            error: None,
            request_id: None,
            retry_count: 0,
            time: SystemTime::now(),
            construction_error,
        }
    }

    pub fn with_retryer(mut self, retryer: Arc<dyn Retryer>) -> Self {
        self.retryer = retryer;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn info(&self) -> &ClientInfo {
        &self.info
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }

    pub fn retryer(&self) -> &dyn Retryer {
        self.retryer.as_ref()
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn params(&self) -> &serde_json::Value {
        &self.params
    }

    pub fn set_params(&mut self, params: serde_json::Value) {
        self.params = params;
    }

    pub fn http_request(&self) -> &http::Request<SdkBody> {
        &self.http_request
    }

    pub fn http_request_mut(&mut self) -> &mut http::Request<SdkBody> {
        &mut self.http_request
    }

    pub fn http_response(&self) -> Option<&http::Response<Bytes>> {
        self.http_response.as_ref()
    }

    pub fn set_http_response(&mut self, response: http::Response<Bytes>) {
        self.http_response = Some(response);
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    pub fn set_data(&mut self, data: serde_json::Value) {
        self.data = Some(data);
    }

    /// The error of the current attempt, visible to `unmarshal_error` and `complete` handlers.
    pub fn error(&self) -> Option<&SdkError> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, error: SdkError) {
        self.error = Some(error);
    }

    pub fn take_error(&mut self) -> Option<SdkError> {
        self.error.take()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn set_request_id(&mut self, request_id: impl Into<String>) {
        self.request_id = Some(request_id.into());
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Time the request is signed with.
    pub fn time(&self) -> SystemTime {
        self.time
    }

    pub fn set_time(&mut self, time: SystemTime) {
        self.time = time;
    }

    /// Run every handler phase and return the decoded response
    ///
    /// `validate` and `build` run once. Each attempt then starts again from the built, unsigned
    /// HTTP request. Failed attempts are retried while the retryer allows it. `complete` runs
    /// exactly once, including after construction and validation failures, and an error it
    /// returns never replaces the request's own error.
    pub async fn send(mut self) -> Result<Output, SdkError> {
        let handlers = self.handlers.clone();
        if let Err(err) = self.execute(&handlers).await {
            self.error = Some(err);
        }
        let completed = handlers.complete.run(&mut self).await;
        if let Some(err) = self.error.take() {
            if let Err(complete_err) = completed {
                tracing::debug!(error = %complete_err, "complete handler failed");
            }
            return Err(err);
        }
        completed?;
        Ok(Output {
            status: self
                .http_response
                .as_ref()
                .map(|response| response.status())
                .unwrap_or(StatusCode::OK),
            data: self.data.take().unwrap_or(serde_json::Value::Null),
            request_id: self.request_id.take(),
            retry_count: self.retry_count,
        })
    }

    async fn execute(&mut self, handlers: &Handlers) -> Result<(), SdkError> {
        if let Some(err) = self.construction_error.take() {
            return Err(err);
        }
        handlers.validate.run(self).await?;
        handlers.build.run(self).await?;
        let built = clone_request(&self.http_request);
        loop {
            self.http_request = clone_request(&built);
            self.http_response = None;
            self.data = None;
            self.error = None;
            self.request_id = None;
            let err = match self.attempt(handlers).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            let retryable = self.retry_count < self.retryer.max_retries()
                && self.retryer.should_retry(&err);
            if !retryable {
                tracing::debug!(
                    operation = %self.operation.name(),
                    attempts = self.retry_count + 1,
                    error = %err,
                    "request failed"
                );
                return Err(err);
            }
            let delay = self.retryer.retry_delay(self.retry_count, &err);
            tracing::debug!(
                operation = %self.operation.name(),
                retry = self.retry_count + 1,
                delay = ?delay,
                error = %err,
                "retrying request"
            );
            self.retry_count += 1;
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&mut self, handlers: &Handlers) -> Result<(), SdkError> {
        handlers.sign.run(self).await?;
        handlers.send.run(self).await?;
        handlers.unmarshal_meta.run(self).await?;
        if let Err(err) = handlers.validate_response.run(self).await {
            self.error = Some(err);
            handlers.unmarshal_error.run(self).await?;
            return match self.error.take() {
                Some(err) => Err(err),
                None => Ok(()),
            };
        }
        handlers.unmarshal.run(self).await
    }
}

pub(crate) fn clone_request(request: &http::Request<SdkBody>) -> http::Request<SdkBody> {
    let mut cloned = http::Request::new(request.body().clone());
    *cloned.method_mut() = request.method().clone();
    *cloned.uri_mut() = request.uri().clone();
    *cloned.version_mut() = request.version();
    *cloned.headers_mut() = request.headers().clone();
    cloned
}

/// Decoded result of a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub data: serde_json::Value,
    pub request_id: Option<String>,
    pub status: StatusCode,
    /// Number of retries before the call succeeded
    pub retry_count: u32,
}

impl Output {
    pub fn deserialize<O: DeserializeOwned>(&self) -> Result<O, SdkError> {
        serde_json::from_value(self.data.clone()).map_err(|err| SdkError::ResponseError {
            status: self.status,
            source: err.into(),
        })
    }
}
