/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! SigV4 request signing

use crate::credentials::{Credentials, CredentialsError};
use crate::error::{BoxError, SdkError};
use crate::handlers::{Handler, HandlerFuture, NamedHandler};
use crate::request::Request;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};

pub const SIGN_REQUEST_HANDLER: &str = "v4.SignRequestHandler";

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("no credentials provider is configured")]
    NoCredentialsProvider,
    #[error("failed to load credentials from the credentials provider")]
    Credentials(#[from] CredentialsError),
    #[error("no signing region is known for the request")]
    MissingSigningRegion,
    #[error("invalid signing parameters: {0}")]
    Params(#[source] BoxError),
    #[error("signing failed: {0}")]
    Signing(#[source] BoxError),
}

impl From<SigningError> for SdkError {
    fn from(err: SigningError) -> Self {
        SdkError::construction_failure(err)
    }
}

/// Sign requests with SigV4
///
/// The signature covers the request as built, using:
/// - credentials from the configured credentials provider
/// - the client's signing region, or the configured region
/// - the client's signing name, or the service name
/// - [`Request::time`](crate::request::Request::time) as the signing time
///
/// Any of these missing is a construction failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignRequestHandler;

impl SignRequestHandler {
    async fn sign(&self, request: &mut Request) -> Result<(), SigningError> {
        let provider = request
            .config()
            .credentials_provider()
            .cloned()
            .ok_or(SigningError::NoCredentialsProvider)?;
        let credentials = provider.provide_credentials().await?;
        sign_request(request, &credentials)
    }
}

fn sign_request(request: &mut Request, credentials: &Credentials) -> Result<(), SigningError> {
    let info = request.info();
    let region = info
        .signing_region
        .as_ref()
        .map(|region| region.as_ref().to_string())
        .or_else(|| request.config().region().map(|region| region.to_string()))
        .ok_or(SigningError::MissingSigningRegion)?;
    let service = info
        .signing_name
        .as_ref()
        .map(|name| name.as_ref().to_string())
        .unwrap_or_else(|| info.service_name.to_string());
    let time = request.time();
    let log_signing = request.config().log_level().logs_signing();

    let mut builder = SigningParams::builder()
        .access_key(credentials.access_key_id())
        .secret_key(credentials.secret_access_key())
        .region(&region)
        .service_name(&service)
        .time(time)
        .settings(SigningSettings::default());
    builder.set_security_token(credentials.session_token());
    let params = builder
        .build()
        .map_err(|err| SigningError::Params(err.into()))?;

    let http_request = request.http_request_mut();
    let (instructions, signature) = {
        let body = http_request.body().bytes().unwrap_or_default();
        let signable = SignableRequest::new(
            http_request.method(),
            http_request.uri(),
            http_request.headers(),
            SignableBody::Bytes(body),
        );
        sign(signable, &params)
            .map_err(|err| SigningError::Signing(err.into()))?
            .into_parts()
    };
    instructions.apply_to_request(http_request);
    if log_signing {
        tracing::debug!(
            region = %region,
            service = %service,
            access_key_id = %credentials.access_key_id(),
            signature = %signature,
            "signed request"
        );
    }
    Ok(())
}

impl Handler for SignRequestHandler {
    fn handle<'a>(&'a self, request: &'a mut Request) -> HandlerFuture<'a> {
        Box::pin(async move { self.sign(request).await.map_err(SdkError::from) })
    }
}

pub fn sign_request_handler() -> NamedHandler {
    NamedHandler::new(SIGN_REQUEST_HANDLER, SignRequestHandler)
}

#[cfg(test)]
mod test {
    use super::sign_request_handler;
    use crate::client::ClientInfo;
    use crate::config::{Config, LogLevel};
    use crate::credentials::Credentials;
    use crate::error::SdkError;
    use crate::handlers::Handlers;
    use crate::operation::Operation;
    use crate::region::{Region, SigningRegion, SigningService};
    use crate::request::Request;
    use std::sync::Arc;
    use std::time::{Duration, UNIX_EPOCH};
    use tracing_test::traced_test;

    fn request(config: Config, info: ClientInfo) -> Request {
        let mut request = Request::new(
            Arc::new(config),
            Arc::new(info),
            Handlers::default(),
            Operation::new("Op"),
            serde_json::Value::Null,
        );
        request.set_time(UNIX_EPOCH + Duration::from_secs(1614952162));
        request
    }

    fn info() -> ClientInfo {
        let mut info = ClientInfo::new("svc", "Svc", "2021-01-01");
        info.endpoint = Some("https://svc.us-east-1.amazonaws.com".into());
        info
    }

    #[tokio::test]
    #[traced_test]
    async fn signs_with_client_signing_scope() {
        let mut info = info();
        info.signing_region = Some(SigningRegion::from_static("eu-west-1"));
        info.signing_name = Some(SigningService::from_static("signer"));
        let config = Config::builder()
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::from_keys("AKID", "SECRET", Some("TOKEN".into())))
            .log_level(LogLevel::DebugWithSigning)
            .build();
        let mut req = request(config, info);
        sign_request_handler()
            .handler
            .handle(&mut req)
            .await
            .expect("signed");
        let headers = req.http_request().headers();
        let auth = headers["authorization"].to_str().unwrap();
        assert!(
            auth.starts_with(
                "AWS4-HMAC-SHA256 Credential=AKID/20210305/eu-west-1/signer/aws4_request"
            ),
            "{}",
            auth
        );
        assert_eq!(headers["x-amz-security-token"], "TOKEN");
        assert_eq!(headers["x-amz-date"], "20210305T134922Z");
        assert!(logs_contain("signed request"));
        assert!(!logs_contain("SECRET"));
    }

    #[tokio::test]
    async fn falls_back_to_region_and_service_name() {
        let config = Config::builder()
            .region(Region::new("ap-southeast-2"))
            .credentials_provider(Credentials::from_keys("AKID", "SECRET", None))
            .build();
        let mut req = request(config, info());
        sign_request_handler().handler.handle(&mut req).await.unwrap();
        let auth = req.http_request().headers()["authorization"]
            .to_str()
            .unwrap()
            .to_string();
        assert!(auth.contains("/ap-southeast-2/svc/aws4_request"), "{}", auth);
    }

    #[tokio::test]
    async fn missing_inputs_are_construction_failures() {
        let mut req = request(Config::default(), info());
        let err = sign_request_handler()
            .handler
            .handle(&mut req)
            .await
            .expect_err("no credentials");
        assert!(matches!(err, SdkError::ConstructionFailure(_)));
        assert!(err.to_string().contains("no credentials provider"));

        let config = Config::builder()
            .credentials_provider(Credentials::from_keys("AKID", "SECRET", None))
            .build();
        let mut req = request(config, info());
        let err = sign_request_handler()
            .handler
            .handle(&mut req)
            .await
            .expect_err("no region");
        assert!(err.to_string().contains("no signing region"));
    }
}
