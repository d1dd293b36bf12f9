/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Handlers installed by default on every session

use crate::error::{ErrorMetadata, GenericServiceError, SdkError};
use crate::handlers::{handler_fn, Handler, HandlerFuture, NamedHandler};
use crate::request::{clone_request, Request};
use http::header::{HeaderValue, USER_AGENT};
use std::borrow::Cow;

pub const VALIDATE_ENDPOINT: &str = "core.ValidateEndpointHandler";
pub const USER_AGENT_HANDLER: &str = "core.SDKVersionUserAgentHandler";
pub const SEND_HANDLER: &str = "core.SendHandler";
pub const VALIDATE_RESPONSE: &str = "core.ValidateResponseHandler";
pub const LOG_HTTP_REQUEST: &str = "core.LogHTTPRequestHandler";
pub const LOG_HTTP_RESPONSE: &str = "core.LogHTTPResponseHandler";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("could not find region configuration")]
    MissingRegion,
    #[error("`{0}`: no endpoint could be resolved and none was configured")]
    MissingEndpoint(Cow<'static, str>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("no connector is configured")]
    NoConnector,
}

/// Fails when neither a signing region nor a region is known, or there is no endpoint
pub fn validate_endpoint_handler() -> NamedHandler {
    NamedHandler::new(
        VALIDATE_ENDPOINT,
        handler_fn(|request| {
            let info = request.info();
            if info.signing_region.is_none() && request.config().region().is_none() {
                return Err(SdkError::construction_failure(ValidationError::MissingRegion));
            }
            if info.endpoint.is_none() {
                return Err(SdkError::construction_failure(
                    ValidationError::MissingEndpoint(info.service_name.clone()),
                ));
            }
            Ok(())
        }),
    )
}

/// Sets `User-Agent: aws-client-rust/{version} ({os}; {arch})`
pub fn user_agent_handler() -> NamedHandler {
    NamedHandler::new(
        USER_AGENT_HANDLER,
        handler_fn(|request| {
            let user_agent = format!(
                "{}/{} ({}; {})",
                crate::SDK_NAME,
                crate::SDK_VERSION,
                std::env::consts::OS,
                std::env::consts::ARCH
            );
            let value = HeaderValue::try_from(user_agent).map_err(SdkError::construction_failure)?;
            request.http_request_mut().headers_mut().insert(USER_AGENT, value);
            Ok(())
        }),
    )
}

struct SendHandler;

impl Handler for SendHandler {
    fn handle<'a>(&'a self, request: &'a mut Request) -> HandlerFuture<'a> {
        Box::pin(async move {
            let connector = request
                .config()
                .connector()
                .cloned()
                .ok_or_else(|| SdkError::dispatch_failure(SendError::NoConnector))?;
            // the signed request stays on `request` for the later phases
            let http_request = clone_request(request.http_request());
            let response = connector
                .call(http_request)
                .await
                .map_err(SdkError::DispatchFailure)?;
            request.set_http_response(response);
            Ok(())
        })
    }
}

/// Sends the request through the configured connector
pub fn send_handler() -> NamedHandler {
    NamedHandler::new(SEND_HANDLER, SendHandler)
}

/// Fails with a generic `UnknownError` service error for any response status of 300 or above
///
/// The protocol's `unmarshal_error` handler replaces it with the decoded error.
pub fn validate_response_handler() -> NamedHandler {
    NamedHandler::new(
        VALIDATE_RESPONSE,
        handler_fn(|request| {
            let status = match request.http_response() {
                Some(response) => response.status(),
                None => return Ok(()),
            };
            if status.as_u16() < 300 {
                return Ok(());
            }
            let mut meta = ErrorMetadata::new(status);
            meta.code = Some("UnknownError".into());
            meta.message = Some(format!("unexpected status {}", status));
            meta.request_id = request.request_id().map(str::to_string);
            Err(SdkError::ServiceError {
                source: Box::new(GenericServiceError {
                    code: "UnknownError".into(),
                    message: meta.message.clone(),
                }),
                meta,
            })
        }),
    )
}

pub fn log_http_request() -> NamedHandler {
    NamedHandler::new(
        LOG_HTTP_REQUEST,
        handler_fn(|request| {
            let log_level = request.config().log_level();
            let http_request = request.http_request();
            if log_level.logs_body() {
                let body = http_request.body().bytes().unwrap_or_default();
                tracing::debug!(
                    operation = %request.operation().name(),
                    method = %http_request.method(),
                    uri = %http_request.uri(),
                    headers = ?http_request.headers(),
                    body = %String::from_utf8_lossy(body),
                    "sending request"
                );
            } else {
                tracing::debug!(
                    operation = %request.operation().name(),
                    method = %http_request.method(),
                    uri = %http_request.uri(),
                    headers = ?http_request.headers(),
                    "sending request"
                );
            }
            Ok(())
        }),
    )
}

pub fn log_http_response() -> NamedHandler {
    NamedHandler::new(
        LOG_HTTP_RESPONSE,
        handler_fn(|request| {
            let response = match request.http_response() {
                Some(response) => response,
                None => return Ok(()),
            };
            if request.config().log_level().logs_body() {
                tracing::debug!(
                    operation = %request.operation().name(),
                    status = %response.status(),
                    headers = ?response.headers(),
                    body = %String::from_utf8_lossy(response.body()),
                    "received response"
                );
            } else {
                tracing::debug!(
                    operation = %request.operation().name(),
                    status = %response.status(),
                    headers = ?response.headers(),
                    "received response"
                );
            }
            Ok(())
        }),
    )
}
