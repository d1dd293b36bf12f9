/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// The region to send requests to.
///
/// The region MUST be known before a request is dispatched. It may be configured on the shared
/// [`Config`](crate::Config) or overridden per client.
///
/// See <http://docs.aws.amazon.com/general/latest/gr/rande.html> for the list of regions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region(Cow<'static, str>);

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Region {
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Self(region.into())
    }

    pub const fn from_static(region: &'static str) -> Self {
        Self(Cow::Borrowed(region))
    }
}

/// The region to use when signing requests
///
/// Generally, user code will not need to interact with `SigningRegion`. See [`Region`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SigningRegion(Cow<'static, str>);

impl AsRef<str> for SigningRegion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Region> for SigningRegion {
    fn from(region: Region) -> Self {
        SigningRegion(region.0)
    }
}

impl SigningRegion {
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        SigningRegion(region.into())
    }

    pub const fn from_static(region: &'static str) -> Self {
        SigningRegion(Cow::Borrowed(region))
    }
}

/// The name of the service used to sign requests
///
/// For most services this is the endpoint prefix, eg. `lightsail`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SigningService(Cow<'static, str>);

impl AsRef<str> for SigningService {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SigningService {
    pub fn new(service: impl Into<Cow<'static, str>>) -> Self {
        SigningService(service.into())
    }

    pub const fn from_static(service: &'static str) -> Self {
        SigningService(Cow::Borrowed(service))
    }
}
