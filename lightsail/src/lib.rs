/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Amazon Lightsail client.
//!
//! ```no_run
//! use aws_client::{Operation, Session};
//! use lightsail::Lightsail;
//!
//! # async fn run() -> Result<(), aws_client::SdkError> {
//! let session = Session::from_env();
//! let client = Lightsail::new(&session, &[]);
//! let regions: serde_json::Value = client
//!     .invoke(Operation::new("GetRegions"), &serde_json::json!({}))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{
    Builder, InitClient, InitRequest, Lightsail, API_VERSION, ENDPOINTS_ID, JSON_VERSION,
    SERVICE_ID, SERVICE_NAME, TARGET_PREFIX,
};
pub use error::{exception_from_code, ExceptionDetail, LightsailError};
