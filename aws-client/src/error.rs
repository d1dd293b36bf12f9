/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use http::StatusCode;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Attributes shared by every error response returned by a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMetadata {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
    pub status: StatusCode,
}

impl ErrorMetadata {
    pub fn new(status: StatusCode) -> Self {
        ErrorMetadata {
            code: None,
            message: None,
            request_id: None,
            status,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

/// Service error whose code has no modeled counterpart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericServiceError {
    pub code: String,
    pub message: Option<String>,
}

impl Display for GenericServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.code, message),
            None => write!(f, "{}", self.code),
        }
    }
}

impl Error for GenericServiceError {}

/// Failure while executing a request
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The request failed during construction. It was not dispatched over the network.
    #[error("failed to construct request: {0}")]
    ConstructionFailure(#[source] BoxError),

    /// The request failed during dispatch. An HTTP response was not received. The request MAY
    /// have been sent.
    #[error("failed to dispatch request: {0}")]
    DispatchFailure(#[source] BoxError),

    /// A response was received but it was not parseable according to the protocol
    #[error("unparseable response (status {status}): {source}")]
    ResponseError {
        status: StatusCode,
        #[source]
        source: BoxError,
    },

    /// An error response was received from the service
    #[error("service error: {source}")]
    ServiceError {
        meta: ErrorMetadata,
        #[source]
        source: BoxError,
    },
}

impl SdkError {
    pub fn construction_failure(err: impl Into<BoxError>) -> Self {
        SdkError::ConstructionFailure(err.into())
    }

    pub fn dispatch_failure(err: impl Into<BoxError>) -> Self {
        SdkError::DispatchFailure(err.into())
    }

    /// Error metadata, when the service returned an error response.
    pub fn meta(&self) -> Option<&ErrorMetadata> {
        match self {
            SdkError::ServiceError { meta, .. } => Some(meta),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.meta().and_then(ErrorMetadata::code)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.meta().and_then(ErrorMetadata::request_id)
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::ResponseError { status, .. } => Some(*status),
            SdkError::ServiceError { meta, .. } => Some(meta.status),
            _ => None,
        }
    }

    /// The service error as a concrete type, eg. a service crate's modeled error enum.
    ///
    /// Returns `None` for non-service errors and for service errors of another type.
    pub fn downcast_service_error<E: Error + 'static>(&self) -> Option<&E> {
        match self {
            SdkError::ServiceError { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}
