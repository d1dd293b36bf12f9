/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Shared runtime for AWS service clients.
//!
//! A service crate builds a [`Client`] from a [`ClientConfig`] produced by a
//! [`ConfigProvider`] (usually a [`Session`]), appends the signing and protocol handlers it needs
//! to the client's [`Handlers`](handlers::Handlers), and creates one
//! [`Request`](request::Request) per call. Executing a request runs the handler phases in a fixed
//! order:
//!
//! 1. `validate`
//! 2. `build`
//! 3. `sign`
//! 4. `send`
//! 5. `unmarshal_meta`
//! 6. `validate_response`
//! 7. `unmarshal` on success, `unmarshal_error` otherwise
//! 8. `complete`
//!
//! Phases 3 through 7 are repeated for each retry attempt.

pub mod body;
pub mod client;
pub mod config;
pub mod connector;
pub mod corehandlers;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod handlers;
pub mod operation;
pub mod os;
pub mod profile;
pub mod protocol;
pub mod region;
pub mod request;
pub mod retry;
pub mod session;
pub mod sign;

#[cfg(any(test, feature = "test-util"))]
pub mod test_connection;

pub use client::{Client, ClientInfo};
pub use config::{Config, LogLevel};
pub use credentials::Credentials;
pub use error::{BoxError, ErrorMetadata, SdkError};
pub use operation::Operation;
pub use region::{Region, SigningRegion, SigningService};
pub use request::{Output, Request};
pub use session::{ClientConfig, ConfigProvider, Session};

/// Name reported in the `User-Agent` header of every request.
pub const SDK_NAME: &str = "aws-client-rust";

/// Version reported in the `User-Agent` header of every request.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
