/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use aws_client::protocol::aws_json::TypedErrors;
use aws_client::{BoxError, ErrorMetadata};
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};

/// Fields shared by every Lightsail exception
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExceptionDetail {
    #[serde(skip)]
    pub code: Option<String>,
    pub docs: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
    pub tip: Option<String>,
}

impl Display for ExceptionDetail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code.as_deref().unwrap_or("UnknownError"))?;
        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

/// Errors modeled by the Lightsail API
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LightsailError {
    #[error("access denied ({0})")]
    AccessDenied(ExceptionDetail),
    #[error("account setup in progress ({0})")]
    AccountSetupInProgress(ExceptionDetail),
    #[error("invalid input ({0})")]
    InvalidInput(ExceptionDetail),
    #[error("not found ({0})")]
    NotFound(ExceptionDetail),
    #[error("operation failure ({0})")]
    OperationFailure(ExceptionDetail),
    #[error("region setup in progress ({0})")]
    RegionSetupInProgress(ExceptionDetail),
    #[error("service error ({0})")]
    Service(ExceptionDetail),
    #[error("unauthenticated ({0})")]
    Unauthenticated(ExceptionDetail),
}

impl LightsailError {
    pub fn detail(&self) -> &ExceptionDetail {
        match self {
            LightsailError::AccessDenied(detail)
            | LightsailError::AccountSetupInProgress(detail)
            | LightsailError::InvalidInput(detail)
            | LightsailError::NotFound(detail)
            | LightsailError::OperationFailure(detail)
            | LightsailError::RegionSetupInProgress(detail)
            | LightsailError::Service(detail)
            | LightsailError::Unauthenticated(detail) => detail,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.detail().code.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.detail().message.as_deref()
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LightsailError::NotFound(_))
    }
}

fn detail(meta: &ErrorMetadata, body: &[u8]) -> Result<ExceptionDetail, serde_json::Error> {
    let mut detail: ExceptionDetail = if body.iter().all(u8::is_ascii_whitespace) {
        ExceptionDetail::default()
    } else {
        serde_json::from_slice(body)?
    };
    detail.code = meta.code().map(str::to_string);
    if detail.message.is_none() {
        detail.message = meta.message().map(str::to_string);
    }
    Ok(detail)
}

macro_rules! constructor {
    ($variant:ident) => {{
        fn construct(meta: &ErrorMetadata, body: &[u8]) -> Result<BoxError, serde_json::Error> {
            Ok(Box::new(LightsailError::$variant(detail(meta, body)?)))
        }
        construct
    }};
}

/// Error codes of the Lightsail API mapped to their [`LightsailError`] variant
pub fn exception_from_code() -> TypedErrors {
    TypedErrors::new()
        .with("AccessDeniedException", constructor!(AccessDenied))
        .with(
            "AccountSetupInProgressException",
            constructor!(AccountSetupInProgress),
        )
        .with("InvalidInputException", constructor!(InvalidInput))
        .with("NotFoundException", constructor!(NotFound))
        .with("OperationFailureException", constructor!(OperationFailure))
        .with(
            "RegionSetupInProgressException",
            constructor!(RegionSetupInProgress),
        )
        .with("ServiceException", constructor!(Service))
        .with("UnauthenticatedException", constructor!(Unauthenticated))
}

#[cfg(test)]
mod test {
    use super::{exception_from_code, LightsailError};
    use aws_client::ErrorMetadata;
    use http::StatusCode;

    fn meta(code: &str) -> ErrorMetadata {
        let mut meta = ErrorMetadata::new(StatusCode::BAD_REQUEST);
        meta.code = Some(code.to_string());
        meta
    }

    #[test]
    fn maps_every_modeled_exception() {
        let errors = exception_from_code();
        assert_eq!(errors.len(), 8);
        for code in [
            "AccessDeniedException",
            "AccountSetupInProgressException",
            "InvalidInputException",
            "NotFoundException",
            "OperationFailureException",
            "RegionSetupInProgressException",
            "ServiceException",
            "UnauthenticatedException",
        ] {
            assert!(errors.contains(code), "{}", code);
        }
        assert!(!errors.contains("ThrottlingException"));
    }

    #[test]
    fn builds_typed_error_from_body() {
        let construct = exception_from_code()
            .get("NotFoundException")
            .expect("modeled");
        let body = br#"{"__type":"NotFoundException","message":"no instance","tip":"check the name","docs":"https://lightsail.aws.amazon.com"}"#;
        let err = construct(&meta("NotFoundException"), body).expect("valid body");
        let err = err.downcast_ref::<LightsailError>().expect("lightsail error");
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some("NotFoundException"));
        assert_eq!(err.message(), Some("no instance"));
        assert_eq!(err.detail().tip.as_deref(), Some("check the name"));
        assert_eq!(
            err.to_string(),
            "not found (NotFoundException: no instance)"
        );
    }

    #[test]
    fn empty_body_uses_metadata() {
        let construct = exception_from_code().get("ServiceException").expect("modeled");
        let mut meta = meta("ServiceException");
        meta.message = Some("internal".into());
        let err = construct(&meta, b"").expect("empty body");
        let err = err.downcast_ref::<LightsailError>().expect("lightsail error");
        assert!(matches!(err, LightsailError::Service(_)));
        assert_eq!(err.message(), Some("internal"));
    }
}
