/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use http::Method;
use std::borrow::Cow;

/// Descriptor of an API operation
///
/// JSON RPC services route on the operation name; every call is a `POST` to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    name: Cow<'static, str>,
    http_method: Method,
    http_path: Cow<'static, str>,
}

impl Operation {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Operation {
            name: name.into(),
            http_method: Method::POST,
            http_path: Cow::Borrowed("/"),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.http_method = method;
        self
    }

    pub fn with_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
        self.http_path = path.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn http_method(&self) -> &Method {
        &self.http_method
    }

    pub fn http_path(&self) -> &str {
        &self.http_path
    }
}

impl From<&'static str> for Operation {
    fn from(name: &'static str) -> Self {
        Operation::new(name)
    }
}
