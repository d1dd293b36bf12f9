/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! AWS credentials and the providers that load them
//!
//! [`Credentials`] implement [`ProvideCredentials`] directly, so static keys can be handed to
//! [`Config::builder`](crate::Config::builder) without a custom provider:
//! ```rust
//! use aws_client::{Config, Credentials};
//! let config = Config::builder()
//!     .credentials_provider(Credentials::from_keys("akid", "secret", None))
//!     .build();
//! ```

use crate::error::BoxError;
use crate::os::{Env, Fs};
use crate::profile;
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// AWS SDK Credentials
///
/// An opaque struct representing credentials that may be used in an AWS SDK, modeled on
/// the [CRT credentials implementation](https://github.com/awslabs/aws-c-auth/blob/main/source/credentials.c).
///
/// Credentials uses an interior Arc so that clones share a single copy of the secret.
#[derive(Clone)]
pub struct Credentials(Arc<Inner>);

struct Inner {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expires_after: Option<SystemTime>,
    provider_name: &'static str,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut creds = f.debug_struct("Credentials");
        creds
            .field("provider_name", &self.0.provider_name)
            .field("access_key_id", &self.0.access_key_id)
            .field("secret_access_key", &"** redacted **");
        if let Some(expiry) = self.expiry() {
            if let Ok(since_epoch) = expiry.duration_since(UNIX_EPOCH) {
                creds.field("expires_after", &since_epoch.as_secs());
            }
        }
        creds.finish()
    }
}

const STATIC_CREDENTIALS: &str = "Static";

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expires_after: Option<SystemTime>,
        provider_name: &'static str,
    ) -> Self {
        Credentials(Arc::new(Inner {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            expires_after,
            provider_name,
        }))
    }

    pub fn from_keys(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            STATIC_CREDENTIALS,
        )
    }

    pub fn access_key_id(&self) -> &str {
        &self.0.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.0.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.0.session_token.as_deref()
    }

    pub fn expiry(&self) -> Option<SystemTime> {
        self.0.expires_after
    }

    pub fn provider_name(&self) -> &'static str {
        self.0.provider_name
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CredentialsError {
    /// No credentials were available for this provider
    #[error("the provider could not provide credentials or required configuration was not set: {0}")]
    CredentialsNotLoaded(String),

    /// The provider was given an invalid configuration, eg. a syntax error in `~/.aws/config`
    #[error("the credentials provider was not properly configured: {0}")]
    InvalidConfiguration(String),

    /// The provider experienced an error during credential resolution
    #[error("an error occurred while loading credentials: {0}")]
    ProviderError(#[source] BoxError),
}

pub type Result = std::result::Result<Credentials, CredentialsError>;

pub type CredentialsFuture<'a> = Pin<Box<dyn Future<Output = Result> + Send + 'a>>;

/// Asynchronous Credentials Provider
pub trait ProvideCredentials: Send + Sync + Debug {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a>;
}

pub type SharedCredentialsProvider = Arc<dyn ProvideCredentials>;

impl ProvideCredentials for Credentials {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a> {
        Box::pin(std::future::ready(Ok(self.clone())))
    }
}

/// Load Credentials from Environment Variables
///
/// Reads `AWS_ACCESS_KEY_ID` (or `AWS_ACCESS_KEY`), `AWS_SECRET_ACCESS_KEY` (or
/// `AWS_SECRET_KEY`) and optionally `AWS_SESSION_TOKEN`. Empty values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariableCredentialsProvider {
    env: Env,
}

impl EnvironmentVariableCredentialsProvider {
    pub fn new() -> Self {
        Self::new_with_env(Env::real())
    }

    pub fn new_with_env(env: Env) -> Self {
        EnvironmentVariableCredentialsProvider { env }
    }

    fn credentials(&self) -> Result {
        let access_key = self
            .env
            .first_non_empty(&["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"])
            .ok_or_else(|| {
                CredentialsError::CredentialsNotLoaded("AWS_ACCESS_KEY_ID is not set".into())
            })?;
        let secret_key = self
            .env
            .first_non_empty(&["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"])
            .ok_or_else(|| {
                CredentialsError::CredentialsNotLoaded("AWS_SECRET_ACCESS_KEY is not set".into())
            })?;
        let session_token = self.env.first_non_empty(&["AWS_SESSION_TOKEN"]);
        Ok(Credentials::new(
            access_key,
            secret_key,
            session_token,
            None,
            "EnvironmentVariable",
        ))
    }
}

impl ProvideCredentials for EnvironmentVariableCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a> {
        Box::pin(std::future::ready(self.credentials()))
    }
}

/// Load static credentials from the selected profile of the shared config and credentials files
#[derive(Debug, Clone, Default)]
pub struct ProfileFileCredentialsProvider {
    env: Env,
    fs: Fs,
}

impl ProfileFileCredentialsProvider {
    pub fn new() -> Self {
        Self::new_with(Env::real(), Fs::real())
    }

    pub fn new_with(env: Env, fs: Fs) -> Self {
        ProfileFileCredentialsProvider { env, fs }
    }

    fn credentials(&self) -> Result {
        let profiles = profile::load(&self.env, &self.fs)
            .map_err(|err| CredentialsError::InvalidConfiguration(err.to_string()))?;
        let selected = profiles.selected_profile_name().to_string();
        let profile = profiles.selected_profile().ok_or_else(|| {
            CredentialsError::CredentialsNotLoaded(format!("profile `{}` was not defined", selected))
        })?;
        let access_key = profile.get("aws_access_key_id").ok_or_else(|| {
            CredentialsError::CredentialsNotLoaded(format!(
                "profile `{}` has no aws_access_key_id",
                selected
            ))
        })?;
        let secret_key = profile.get("aws_secret_access_key").ok_or_else(|| {
            CredentialsError::InvalidConfiguration(format!(
                "profile `{}` sets aws_access_key_id without aws_secret_access_key",
                selected
            ))
        })?;
        Ok(Credentials::new(
            access_key,
            secret_key,
            profile.get("aws_session_token").map(str::to_string),
            None,
            "ProfileFile",
        ))
    }
}

impl ProvideCredentials for ProfileFileCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a> {
        Box::pin(std::future::ready(self.credentials()))
    }
}

/// Credentials provider that queries a list of providers in order
///
/// A provider reporting [`CredentialsError::CredentialsNotLoaded`] hands over to the next one.
/// Any other error ends the search.
#[derive(Debug)]
pub struct ChainProvider {
    providers: Vec<(&'static str, Box<dyn ProvideCredentials>)>,
}

impl ChainProvider {
    pub fn first_try(name: &'static str, provider: impl ProvideCredentials + 'static) -> Self {
        ChainProvider {
            providers: vec![(name, Box::new(provider))],
        }
    }

    pub fn or_else(mut self, name: &'static str, provider: impl ProvideCredentials + 'static) -> Self {
        self.providers.push((name, Box::new(provider)));
        self
    }

    async fn credentials(&self) -> Result {
        for (name, provider) in &self.providers {
            match provider.provide_credentials().await {
                Ok(credentials) => {
                    tracing::debug!(provider = %name, "loaded credentials");
                    return Ok(credentials);
                }
                Err(CredentialsError::CredentialsNotLoaded(reason)) => {
                    tracing::debug!(provider = %name, %reason, "provider in chain did not provide credentials");
                }
                Err(err) => {
                    tracing::warn!(provider = %name, error = %err, "provider failed to provide credentials");
                    return Err(err);
                }
            }
        }
        Err(CredentialsError::CredentialsNotLoaded(
            "no providers in chain provided credentials".into(),
        ))
    }
}

impl ProvideCredentials for ChainProvider {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a> {
        Box::pin(self.credentials())
    }
}

const DEFAULT_CREDENTIAL_EXPIRATION: Duration = Duration::from_secs(15 * 60);

/// Caches the credentials loaded by another provider until they expire
///
/// Credentials without an expiry are kept for 15 minutes. Concurrent callers wait for a single
/// refresh.
#[derive(Debug)]
pub struct LazyCachingCredentialsProvider {
    refresh: Box<dyn ProvideCredentials>,
    default_credential_expiration: Duration,
    cache: Mutex<Option<(Credentials, SystemTime)>>,
}

impl LazyCachingCredentialsProvider {
    pub fn new(refresh: impl ProvideCredentials + 'static) -> Self {
        LazyCachingCredentialsProvider {
            refresh: Box::new(refresh),
            default_credential_expiration: DEFAULT_CREDENTIAL_EXPIRATION,
            cache: Mutex::new(None),
        }
    }

    /// Lifetime of credentials loaded without an expiry
    pub fn with_default_credential_expiration(mut self, expiration: Duration) -> Self {
        self.default_credential_expiration = expiration;
        self
    }

    async fn credentials(&self) -> Result {
        let mut cache = self.cache.lock().await;
        let now = SystemTime::now();
        if let Some((credentials, expires_at)) = cache.as_ref() {
            if now < *expires_at {
                return Ok(credentials.clone());
            }
            tracing::debug!("cached credentials expired");
        }
        let credentials = self.refresh.provide_credentials().await?;
        let expires_at = credentials
            .expiry()
            .unwrap_or(now + self.default_credential_expiration);
        *cache = Some((credentials.clone(), expires_at));
        Ok(credentials)
    }
}

impl ProvideCredentials for LazyCachingCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> CredentialsFuture<'a> {
        Box::pin(self.credentials())
    }
}

/// Environment variables, then the shared profile files, cached until the credentials expire.
pub fn default_provider(env: Env, fs: Fs) -> LazyCachingCredentialsProvider {
    LazyCachingCredentialsProvider::new(
        ChainProvider::first_try(
            "Environment",
            EnvironmentVariableCredentialsProvider::new_with_env(env.clone()),
        )
        .or_else("Profile", ProfileFileCredentialsProvider::new_with(env, fs)),
    )
}
