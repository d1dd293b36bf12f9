/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Service-agnostic client configuration
//!
//! Every field of [`Config`] is optional so that configuration can be assembled from fragments:
//! a session's base configuration, then any number of per-client overrides merged on top with
//! [`Config::merge_from`].

use crate::connector::{Connector, SharedConnector};
use crate::credentials::{self, ProvideCredentials, SharedCredentialsProvider};
use crate::os::{Env, Fs};
use crate::profile;
use crate::region::Region;
use std::sync::Arc;

/// Amount of request and response detail emitted through `tracing` at debug level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Off,
    /// Log every request and response, without bodies
    Debug,
    /// Additionally log the signing inputs
    DebugWithSigning,
    /// Additionally log request and response bodies
    DebugWithHttpBody,
}

impl LogLevel {
    pub fn is_debug(self) -> bool {
        self != LogLevel::Off
    }

    pub fn logs_signing(self) -> bool {
        self == LogLevel::DebugWithSigning
    }

    pub fn logs_body(self) -> bool {
        self == LogLevel::DebugWithHttpBody
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    region: Option<Region>,
    endpoint: Option<String>,
    credentials_provider: Option<SharedCredentialsProvider>,
    connector: Option<SharedConnector>,
    max_retries: Option<u32>,
    disable_ssl: Option<bool>,
    log_level: Option<LogLevel>,
}

impl Config {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Load configuration from the process environment and the shared profile files.
    pub fn from_env() -> Self {
        Self::load_from(&Env::real(), &Fs::real())
    }

    /// Load configuration from `env` and `fs`
    ///
    /// The region comes from `AWS_REGION`, then `AWS_DEFAULT_REGION`, then the selected profile.
    /// Credentials are resolved lazily through [`credentials::default_provider`].
    pub fn load_from(env: &Env, fs: &Fs) -> Self {
        let region = env
            .first_non_empty(&["AWS_REGION", "AWS_DEFAULT_REGION"])
            .or_else(|| match profile::load(env, fs) {
                Ok(profiles) => profiles
                    .selected_profile()
                    .and_then(|profile| profile.get("region"))
                    .map(str::to_string),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load region from profile");
                    None
                }
            })
            .map(Region::new);
        let provider: SharedCredentialsProvider =
            Arc::new(credentials::default_provider(env.clone(), fs.clone()));
        Config {
            region,
            credentials_provider: Some(provider),
            ..Default::default()
        }
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn credentials_provider(&self) -> Option<&SharedCredentialsProvider> {
        self.credentials_provider.as_ref()
    }

    pub fn connector(&self) -> Option<&SharedConnector> {
        self.connector.as_ref()
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    pub fn disable_ssl(&self) -> bool {
        self.disable_ssl.unwrap_or_default()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// Overwrite every field that is set in `other`.
    pub fn merge_from(&mut self, other: &Config) {
        fn merge<T: Clone>(into: &mut Option<T>, from: &Option<T>) {
            if from.is_some() {
                into.clone_from(from);
            }
        }
        merge(&mut self.region, &other.region);
        merge(&mut self.endpoint, &other.endpoint);
        merge(&mut self.credentials_provider, &other.credentials_provider);
        merge(&mut self.connector, &other.connector);
        merge(&mut self.max_retries, &other.max_retries);
        merge(&mut self.disable_ssl, &other.disable_ssl);
        merge(&mut self.log_level, &other.log_level);
    }

    /// A copy of `self` with `overrides` applied left to right.
    pub fn merged(&self, overrides: &[Config]) -> Config {
        let mut config = self.clone();
        for other in overrides {
            config.merge_from(other);
        }
        config
    }

    pub fn to_builder(&self) -> Builder {
        Builder {
            config: self.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn region(mut self, region: impl Into<Option<Region>>) -> Self {
        self.set_region(region.into());
        self
    }

    pub fn set_region(&mut self, region: Option<Region>) -> &mut Self {
        self.config.region = region;
        self
    }

    /// Send requests to this endpoint instead of the resolved regional endpoint.
    ///
    /// `https://` is assumed when the endpoint has no scheme.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.set_endpoint(Some(endpoint.into()));
        self
    }

    pub fn set_endpoint(&mut self, endpoint: Option<String>) -> &mut Self {
        self.config.endpoint = endpoint;
        self
    }

    pub fn credentials_provider(mut self, provider: impl ProvideCredentials + 'static) -> Self {
        self.set_credentials_provider(Some(Arc::new(provider)));
        self
    }

    pub fn set_credentials_provider(
        &mut self,
        provider: Option<SharedCredentialsProvider>,
    ) -> &mut Self {
        self.config.credentials_provider = provider;
        self
    }

    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.set_connector(Some(Arc::new(connector)));
        self
    }

    pub fn set_connector(&mut self, connector: Option<SharedConnector>) -> &mut Self {
        self.config.connector = connector;
        self
    }

    /// Maximum number of retries after the first attempt. `0` disables retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.set_max_retries(Some(max_retries));
        self
    }

    pub fn set_max_retries(&mut self, max_retries: Option<u32>) -> &mut Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn disable_ssl(mut self, disable_ssl: bool) -> Self {
        self.set_disable_ssl(Some(disable_ssl));
        self
    }

    pub fn set_disable_ssl(&mut self, disable_ssl: Option<bool>) -> &mut Self {
        self.config.disable_ssl = disable_ssl;
        self
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.set_log_level(Some(log_level));
        self
    }

    pub fn set_log_level(&mut self, log_level: Option<LogLevel>) -> &mut Self {
        self.config.log_level = log_level;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod test {
    use super::{Config, LogLevel};
    use crate::credentials::Credentials;
    use crate::os::{Env, Fs};
    use crate::region::Region;
    use std::collections::HashMap;

    #[test]
    fn later_values_win() {
        let mut config = Config::builder()
            .region(Region::new("us-east-1"))
            .max_retries(5)
            .build();
        config.merge_from(
            &Config::builder()
                .region(Region::new("eu-west-1"))
                .endpoint("localhost:8000")
                .build(),
        );
        assert_eq!(config.region(), Some(&Region::new("eu-west-1")));
        assert_eq!(config.endpoint(), Some("localhost:8000"));
        assert_eq!(config.max_retries(), Some(5));
    }

    #[test]
    fn unset_fields_do_not_clear() {
        let base = Config::builder()
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::from_keys("a", "b", None))
            .log_level(LogLevel::Debug)
            .build();
        let merged = base.merged(&[Config::default(), Config::builder().disable_ssl(true).build()]);
        assert_eq!(merged.region(), Some(&Region::new("us-east-1")));
        assert!(merged.credentials_provider().is_some());
        assert!(merged.disable_ssl());
        assert_eq!(merged.log_level(), LogLevel::Debug);
        assert!(!base.disable_ssl());
    }

    #[test]
    fn region_from_env_before_profile() {
        let mut files = HashMap::new();
        files.insert(
            "/home/me/.aws/config".to_string(),
            b"[default]\nregion = ap-northeast-1\n".to_vec(),
        );
        let fs = Fs::from_map(files);
        let from_profile = Config::load_from(&Env::from_slice(&[("HOME", "/home/me")]), &fs);
        assert_eq!(from_profile.region(), Some(&Region::new("ap-northeast-1")));
        assert!(from_profile.credentials_provider().is_some());

        let from_env = Config::load_from(
            &Env::from_slice(&[("HOME", "/home/me"), ("AWS_DEFAULT_REGION", "sa-east-1")]),
            &fs,
        );
        assert_eq!(from_env.region(), Some(&Region::new("sa-east-1")));

        let preferred = Config::load_from(
            &Env::from_slice(&[("AWS_REGION", "us-west-1"), ("AWS_DEFAULT_REGION", "sa-east-1")]),
            &fs,
        );
        assert_eq!(preferred.region(), Some(&Region::new("us-west-1")));
    }

    #[test]
    fn log_levels() {
        assert!(!LogLevel::Off.is_debug());
        assert!(LogLevel::DebugWithSigning.is_debug());
        assert!(LogLevel::DebugWithSigning.logs_signing());
        assert!(!LogLevel::Debug.logs_body());
        assert!(LogLevel::DebugWithHttpBody.logs_body());
    }
}
