/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! AWS JSON RPC (`application/x-amz-json-1.0` and `1.1`)
//!
//! Every call is a `POST` to `/` whose `X-Amz-Target` header names the operation as
//! `{target_prefix}.{operation}`. Inputs and outputs are JSON documents. Errors carry their code in
//! the `__type` field of the body or in the `x-amzn-errortype` header.

use crate::body::SdkBody;
use crate::error::{BoxError, ErrorMetadata, GenericServiceError, SdkError};
use crate::handlers::{handler_fn, NamedHandler};
use crate::protocol::extract_request_id;
use http::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::Method;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

pub const BUILD_HANDLER: &str = "awssdk.jsonrpc.Build";
pub const UNMARSHAL_HANDLER: &str = "awssdk.jsonrpc.Unmarshal";
pub const UNMARSHAL_META_HANDLER: &str = "awssdk.jsonrpc.UnmarshalMeta";
pub const UNMARSHAL_ERROR_HANDLER: &str = "awssdk.jsonrpc.UnmarshalError";

const DEFAULT_JSON_VERSION: &str = "1.0";
const UNKNOWN_ERROR: &str = "UnknownError";

const X_AMZ_TARGET: &str = "x-amz-target";
const X_AMZN_ERRORTYPE: &str = "x-amzn-errortype";

/// Builds a modeled error from the error response body
pub type ErrorConstructor = fn(&ErrorMetadata, &[u8]) -> Result<BoxError, serde_json::Error>;

/// Error codes a service models, mapped to the constructor of their typed error
#[derive(Clone, Default)]
pub struct TypedErrors {
    constructors: HashMap<&'static str, ErrorConstructor>,
}

impl TypedErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: &'static str, constructor: ErrorConstructor) -> Self {
        self.constructors.insert(code, constructor);
        self
    }

    pub fn get(&self, code: &str) -> Option<ErrorConstructor> {
        self.constructors.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.constructors.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Debug for TypedErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.constructors.keys().collect();
        codes.sort();
        f.debug_struct("TypedErrors").field("codes", &codes).finish()
    }
}

/// Encode the request parameters as the JSON body and set the JSON RPC headers
pub fn build_handler() -> NamedHandler {
    NamedHandler::new(
        BUILD_HANDLER,
        handler_fn(|request| {
            let info = request.info();
            let json_version = match info.json_version.as_ref() {
                "" => DEFAULT_JSON_VERSION,
                version => version,
            };
            let content_type = format!("application/x-amz-json-{}", json_version);
            let target = match info.target_prefix.as_ref() {
                "" => None,
                prefix => Some(format!("{}.{}", prefix, request.operation().name())),
            };
            let body = if request.params().is_null() {
                b"{}".to_vec()
            } else {
                serde_json::to_vec(request.params()).map_err(SdkError::construction_failure)?
            };

            let http_request = request.http_request_mut();
            *http_request.method_mut() = Method::POST;
            let headers = http_request.headers_mut();
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::try_from(content_type).map_err(SdkError::construction_failure)?,
            );
            if let Some(target) = target {
                headers.insert(
                    X_AMZ_TARGET,
                    HeaderValue::try_from(target).map_err(SdkError::construction_failure)?,
                );
            }
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            *http_request.body_mut() = SdkBody::from(body);
            Ok(())
        }),
    )
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Decode a successful response body. An empty body decodes to `{}`.
pub fn unmarshal_handler() -> NamedHandler {
    NamedHandler::new(
        UNMARSHAL_HANDLER,
        handler_fn(|request| {
            let response = match request.http_response() {
                Some(response) => response,
                None => return Ok(()),
            };
            let data = if is_blank(response.body()) {
                serde_json::Value::Object(Default::default())
            } else {
                serde_json::from_slice(response.body()).map_err(|err| {
                    SdkError::ResponseError {
                        status: response.status(),
                        source: err.into(),
                    }
                })?
            };
            request.set_data(data);
            Ok(())
        }),
    )
}

/// Record the request ID of the response
pub fn unmarshal_meta_handler() -> NamedHandler {
    NamedHandler::new(
        UNMARSHAL_META_HANDLER,
        handler_fn(|request| {
            let request_id = request
                .http_response()
                .and_then(|response| extract_request_id(response.headers()))
                .map(str::to_string);
            if let Some(request_id) = request_id {
                request.set_request_id(request_id);
            }
            Ok(())
        }),
    )
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Code")]
    code: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Strip a trailing `:{url}` and a leading `{namespace}#` from an error code
fn sanitize_error_code(error_code: &str) -> &str {
    let error_code = match error_code.find(':') {
        Some(idx) => &error_code[..idx],
        None => error_code,
    };
    match error_code.find('#') {
        Some(idx) => &error_code[idx + 1..],
        None => error_code,
    }
}

/// Decode an error response into the typed error for its code, or a [`GenericServiceError`]
///
/// The decoded error replaces the request's error.
pub fn unmarshal_error_handler(errors: TypedErrors) -> NamedHandler {
    NamedHandler::new(
        UNMARSHAL_ERROR_HANDLER,
        handler_fn(move |request| {
            let response = match request.http_response() {
                Some(response) => response,
                None => return Ok(()),
            };
            let error = decode_error(
                &errors,
                response.status(),
                response.headers(),
                response.body(),
                request.request_id(),
            );
            request.set_error(error);
            Ok(())
        }),
    )
}

fn decode_error(
    errors: &TypedErrors,
    status: http::StatusCode,
    headers: &http::HeaderMap,
    body: &[u8],
    request_id: Option<&str>,
) -> SdkError {
    let header_code = headers
        .get(X_AMZN_ERRORTYPE)
        .and_then(|value| value.to_str().ok())
        .map(sanitize_error_code)
        .filter(|code| !code.is_empty());
    let (parsed, body) = if is_blank(body) {
        (ErrorBody::default(), body)
    } else {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => (parsed, body),
            // the header alone is enough to identify the error, typed errors see an empty object
            Err(_) if header_code.is_some() => (ErrorBody::default(), &b"{}"[..]),
            Err(err) => {
                return SdkError::ResponseError {
                    status,
                    source: err.into(),
                }
            }
        }
    };
    let code = parsed
        .error_type
        .as_deref()
        .or(parsed.code.as_deref())
        .map(sanitize_error_code)
        .filter(|code| !code.is_empty())
        .or(header_code)
        .unwrap_or(UNKNOWN_ERROR)
        .to_string();
    let meta = ErrorMetadata {
        code: Some(code.clone()),
        message: parsed.message,
        request_id: request_id.map(str::to_string),
        status,
    };
    let source = match errors.get(&code) {
        Some(constructor) => match constructor(&meta, body) {
            Ok(error) => error,
            Err(err) => {
                return SdkError::ResponseError {
                    status,
                    source: err.into(),
                }
            }
        },
        None => Box::new(GenericServiceError {
            code,
            message: meta.message.clone(),
        }),
    };
    SdkError::ServiceError { meta, source }
}
