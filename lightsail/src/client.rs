/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::error::exception_from_code;
use aws_client::protocol::aws_json;
use aws_client::{
    sign, Client, ClientConfig, ClientInfo, Config, ConfigProvider, Operation, Request, SdkError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Name of the service
pub const SERVICE_NAME: &str = "lightsail";
/// ID used to look up the service's endpoint
pub const ENDPOINTS_ID: &str = SERVICE_NAME;
pub const SERVICE_ID: &str = "Lightsail";
pub const API_VERSION: &str = "2016-11-28";
pub const JSON_VERSION: &str = "1.1";
pub const TARGET_PREFIX: &str = "Lightsail_20161128";

/// Customises a [`Client`] once, after its default handlers are installed
pub type InitClient = Box<dyn FnOnce(&mut Client) + Send>;

/// Customises every [`Request`] before it is executed
pub type InitRequest = Arc<dyn Fn(&mut Request) + Send + Sync>;

/// Amazon Lightsail client
///
/// Cloning is cheap and calls made through clones run independently.
#[derive(Clone)]
pub struct Lightsail {
    client: Client,
    init_request: Option<InitRequest>,
}

impl Debug for Lightsail {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lightsail")
            .field("client", &self.client)
            .field("init_request", &self.init_request.is_some())
            .finish()
    }
}

impl Lightsail {
    /// Create a client from `provider`, with `overrides` applied over its configuration left to
    /// right.
    pub fn new(provider: &impl ConfigProvider, overrides: &[Config]) -> Self {
        Self::builder().overrides(overrides.iter().cloned()).build(provider)
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn client_info(&self) -> &ClientInfo {
        self.client.info()
    }

    pub fn config(&self) -> &Config {
        self.client.config()
    }

    /// Create a request for `operation`. The request's handlers are a private copy of the client's.
    pub fn new_request(&self, operation: Operation, params: serde_json::Value) -> Request {
        let mut request = self.client.new_request(operation, params);
        if let Some(init_request) = &self.init_request {
            init_request(&mut request);
        }
        request
    }

    /// Call `operation` with `input`, decoding the response into `O`.
    pub async fn invoke<I, O>(&self, operation: Operation, input: &I) -> Result<O, SdkError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let params = serde_json::to_value(input).map_err(SdkError::construction_failure)?;
        let output = self.new_request(operation, params).send().await?;
        output.deserialize()
    }
}

/// Builder for [`Lightsail`] with customisation hooks
#[derive(Default)]
pub struct Builder {
    overrides: Vec<Config>,
    init_client: Option<InitClient>,
    init_request: Option<InitRequest>,
}

impl Debug for Builder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("overrides", &self.overrides)
            .field("init_client", &self.init_client.is_some())
            .field("init_request", &self.init_request.is_some())
            .finish()
    }
}

impl Builder {
    /// Add a configuration override. Later overrides win.
    pub fn config_override(mut self, config: Config) -> Self {
        self.overrides.push(config);
        self
    }

    pub fn overrides(mut self, overrides: impl IntoIterator<Item = Config>) -> Self {
        self.overrides.extend(overrides);
        self
    }

    pub fn init_client(
        mut self,
        init_client: impl FnOnce(&mut Client) + Send + 'static,
    ) -> Self {
        self.init_client = Some(Box::new(init_client));
        self
    }

    pub fn init_request(
        mut self,
        init_request: impl Fn(&mut Request) + Send + Sync + 'static,
    ) -> Self {
        self.init_request = Some(Arc::new(init_request));
        self
    }

    pub fn build(self, provider: &impl ConfigProvider) -> Lightsail {
        let client_config = provider.client_config(ENDPOINTS_ID, &self.overrides);
        let mut client = new_client(client_config);
        if let Some(init_client) = self.init_client {
            init_client(&mut client);
        }
        Lightsail {
            client,
            init_request: self.init_request,
        }
    }
}

fn new_client(client_config: ClientConfig) -> Client {
    let mut info = ClientInfo::new(SERVICE_NAME, SERVICE_ID, API_VERSION);
    info.json_version = JSON_VERSION.into();
    info.target_prefix = TARGET_PREFIX.into();
    info.signing_name = Some(client_config.signing_name);
    info.signing_region = client_config.signing_region;
    info.partition_id = client_config.partition_id;
    info.endpoint = client_config.endpoint;
    tracing::debug!(
        service = SERVICE_NAME,
        endpoint = ?info.endpoint,
        signing_region = ?info.signing_region,
        "creating client"
    );

    let mut client = Client::new(client_config.config, info, client_config.handlers);
    let handlers = client.handlers_mut();
    handlers.sign.push_back(sign::sign_request_handler());
    handlers.build.push_back(aws_json::build_handler());
    handlers.unmarshal.push_back(aws_json::unmarshal_handler());
    handlers
        .unmarshal_meta
        .push_back(aws_json::unmarshal_meta_handler());
    handlers
        .unmarshal_error
        .push_back(aws_json::unmarshal_error_handler(exception_from_code()));
    client
}
