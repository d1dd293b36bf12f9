/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Sessions hand out the resolved configuration each service client is built from.

use crate::config::Config;
use crate::corehandlers;
use crate::endpoint;
use crate::handlers::Handlers;
use crate::region::{SigningRegion, SigningService};

/// Everything a service client needs to be constructed
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub config: Config,
    /// Private copy of the provider's handlers
    pub handlers: Handlers,
    pub endpoint: Option<String>,
    pub partition_id: Option<String>,
    pub signing_region: Option<SigningRegion>,
    pub signing_name: SigningService,
    pub signing_name_derived: bool,
}

/// Source of [`ClientConfig`]s
pub trait ConfigProvider {
    /// Resolve the configuration for `service` (its endpoint ID), with `overrides` applied left to
    /// right over the provider's own configuration.
    fn client_config(&self, service: &str, overrides: &[Config]) -> ClientConfig;
}

/// Shared configuration and default handlers for every client created from it
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    handlers: Handlers,
}

impl Session {
    /// Create a session with the default handlers
    ///
    /// When `config` has no connector and the `rustls` feature is enabled, the default HTTPS
    /// connector is installed.
    pub fn new(config: Config) -> Self {
        Self::with_handlers(with_default_connector(config), default_handlers())
    }

    /// Create a session using `handlers` as they are, without adding the defaults.
    pub fn with_handlers(config: Config, handlers: Handlers) -> Self {
        Session { config, handlers }
    }

    /// A session configured from the process environment and the shared profile files.
    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handlers(&self) -> &Handlers {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut Handlers {
        &mut self.handlers
    }
}

/// The handlers every session installs
pub fn default_handlers() -> Handlers {
    let mut handlers = Handlers::default();
    handlers
        .validate
        .push_back(corehandlers::validate_endpoint_handler());
    handlers.build.push_back(corehandlers::user_agent_handler());
    handlers.send.push_back(corehandlers::send_handler());
    handlers
        .validate_response
        .push_back(corehandlers::validate_response_handler());
    handlers
}

#[cfg(feature = "rustls")]
fn with_default_connector(config: Config) -> Config {
    if config.connector().is_some() {
        return config;
    }
    config.to_builder().connector(crate::connector::https()).build()
}

#[cfg(not(feature = "rustls"))]
fn with_default_connector(config: Config) -> Config {
    config
}

impl ConfigProvider for Session {
    fn client_config(&self, service: &str, overrides: &[Config]) -> ClientConfig {
        let config = self.config.merged(overrides);
        let resolved = endpoint::resolve(
            service,
            config.region(),
            config.endpoint(),
            config.disable_ssl(),
        );
        match &resolved {
            Some(resolved) => tracing::debug!(
                service = %service,
                endpoint = %resolved.url,
                partition = %resolved.partition_id,
                "resolved endpoint"
            ),
            None => tracing::debug!(service = %service, "no endpoint could be resolved"),
        }
        let (endpoint, partition_id, signing_region, signing_name, signing_name_derived) =
            match resolved {
                Some(resolved) => (
                    Some(resolved.url),
                    Some(resolved.partition_id),
                    resolved.signing_region,
                    resolved.signing_name,
                    resolved.signing_name_derived,
                ),
                None => (
                    None,
                    None,
                    None,
                    SigningService::new(service.to_string()),
                    true,
                ),
            };
        ClientConfig {
            config,
            handlers: self.handlers.clone(),
            endpoint,
            partition_id,
            signing_region,
            signing_name,
            signing_name_derived,
        }
    }
}
