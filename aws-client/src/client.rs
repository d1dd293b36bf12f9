/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::config::Config;
use crate::corehandlers;
use crate::handlers::Handlers;
use crate::operation::Operation;
use crate::region::{SigningRegion, SigningService};
use crate::request::Request;
use crate::retry::{DefaultRetryer, Retryer, DEFAULT_MAX_RETRIES};
use std::borrow::Cow;
use std::sync::Arc;

/// Static metadata describing the service a [`Client`] talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub service_name: Cow<'static, str>,
    pub service_id: Cow<'static, str>,
    pub api_version: Cow<'static, str>,
    /// Version of the JSON protocol, eg. `1.1` for `application/x-amz-json-1.1`
    pub json_version: Cow<'static, str>,
    /// Prefix of the `X-Amz-Target` header, eg. `Lightsail_20161128`
    pub target_prefix: Cow<'static, str>,
    pub signing_name: Option<SigningService>,
    pub signing_region: Option<SigningRegion>,
    pub partition_id: Option<String>,
    pub endpoint: Option<String>,
}

impl ClientInfo {
    pub fn new(
        service_name: impl Into<Cow<'static, str>>,
        service_id: impl Into<Cow<'static, str>>,
        api_version: impl Into<Cow<'static, str>>,
    ) -> Self {
        ClientInfo {
            service_name: service_name.into(),
            service_id: service_id.into(),
            api_version: api_version.into(),
            json_version: Cow::Borrowed(""),
            target_prefix: Cow::Borrowed(""),
            signing_name: None,
            signing_region: None,
            partition_id: None,
            endpoint: None,
        }
    }
}

/// Handle shared by every request to one service
///
/// Cloning a `Client` is cheap. Configuration and client info are shared; each clone keeps its
/// own copy of the handler lists, and each [`Request`] created from it takes another copy.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<Config>,
    info: Arc<ClientInfo>,
    handlers: Handlers,
    retryer: Arc<dyn Retryer>,
}

impl Client {
    /// Create a client. The retryer honours `config.max_retries()`, and the debug logging
    /// handlers are added when `config.log_level()` asks for them.
    pub fn new(config: Config, info: ClientInfo, handlers: Handlers) -> Self {
        let retryer = DefaultRetryer::new(config.max_retries().unwrap_or(DEFAULT_MAX_RETRIES));
        let mut client = Client {
            config: Arc::new(config),
            info: Arc::new(info),
            handlers,
            retryer: Arc::new(retryer),
        };
        if client.config.log_level().is_debug() {
            client.add_debug_handlers();
        }
        client
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

    pub fn set_retryer(&mut self, retryer: impl Retryer + 'static) {
        self.retryer = Arc::new(retryer);
    }

    /// Log every outgoing request and incoming response at debug level.
    pub fn add_debug_handlers(&mut self) {
        self.handlers.send.set_front_named(corehandlers::log_http_request());
        self.handlers.send.set_back_named(corehandlers::log_http_response());
    }

    /// Create a request for `operation` with its input parameters.
    pub fn new_request(&self, operation: Operation, params: serde_json::Value) -> Request {
        Request::new(
            self.config.clone(),
            self.info.clone(),
            self.handlers.clone(),
            operation,
            params,
        )
        .with_retryer(self.retryer.clone())
    }
}

#[cfg(test)]
mod test {
    use super::{Client, ClientInfo};
    use crate::config::{Config, LogLevel};
    use crate::corehandlers;
    use crate::handlers::Handlers;
    use crate::operation::Operation;
    use crate::retry::{DefaultRetryer, Retryer};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn client_is_send_sync() {
        assert_send_sync::<Client>();
    }

    #[test]
    fn debug_handlers_follow_log_level() {
        let info = ClientInfo::new("svc", "Svc", "2020-01-01");
        let quiet = Client::new(Config::default(), info.clone(), Handlers::default());
        assert!(quiet.handlers().send.is_empty());

        let mut handlers = Handlers::default();
        handlers
            .send
            .set_back_named(corehandlers::send_handler());
        let config = Config::builder().log_level(LogLevel::Debug).build();
        let mut verbose = Client::new(config, info, handlers);
        assert_eq!(
            verbose.handlers().send.names(),
            vec![
                corehandlers::LOG_HTTP_REQUEST,
                corehandlers::SEND_HANDLER,
                corehandlers::LOG_HTTP_RESPONSE
            ]
        );
        verbose.add_debug_handlers();
        assert_eq!(verbose.handlers().send.len(), 3);
    }

    #[test]
    fn requests_copy_client_state() {
        let mut client = Client::new(
            Config::builder().max_retries(1).build(),
            ClientInfo::new("svc", "Svc", "2020-01-01"),
            Handlers::default(),
        );
        assert_eq!(client.retryer().max_retries(), 1);
        client.set_retryer(DefaultRetryer::new(7));
        let mut request = client.new_request(Operation::new("Op"), serde_json::Value::Null);
        assert_eq!(request.retryer().max_retries(), 7);
        assert_eq!(request.operation().name(), "Op");
        request
            .handlers_mut()
            .build
            .push_back(corehandlers::user_agent_handler());
        assert!(client.handlers().build.is_empty());
    }
}
