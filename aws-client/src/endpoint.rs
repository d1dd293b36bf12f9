/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Regional endpoint resolution

use crate::region::{Region, SigningRegion, SigningService};
use once_cell::sync::Lazy;
use regex::Regex;

/// A group of regions sharing a DNS suffix
#[derive(Debug)]
pub struct Partition {
    pub id: &'static str,
    pub dns_suffix: &'static str,
    region_regex: &'static Lazy<Regex>,
}

impl Partition {
    pub fn matches(&self, region: &Region) -> bool {
        self.region_regex.is_match(region.as_ref())
    }
}

static AWS_REGIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(us|eu|ap|sa|ca|me|af|il|mx)\-\w+\-\d+$").expect("valid regex")
});
static AWS_CN_REGIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cn\-\w+\-\d+$").expect("valid regex"));
static AWS_US_GOV_REGIONS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^us\-gov\-\w+\-\d+$").expect("valid regex"));

/// Checked in order; the first partition is also the fallback for unrecognized regions.
static PARTITIONS: [Partition; 3] = [
    Partition {
        id: "aws",
        dns_suffix: "amazonaws.com",
        region_regex: &AWS_REGIONS,
    },
    Partition {
        id: "aws-cn",
        dns_suffix: "amazonaws.com.cn",
        region_regex: &AWS_CN_REGIONS,
    },
    Partition {
        id: "aws-us-gov",
        dns_suffix: "amazonaws.com",
        region_regex: &AWS_US_GOV_REGIONS,
    },
];

pub fn partition_for(region: &Region) -> &'static Partition {
    // `aws` is the fallback for regions no pattern matches
    PARTITIONS[1..]
        .iter()
        .find(|partition| partition.matches(region))
        .unwrap_or(&PARTITIONS[0])
}

/// Endpoint and signing scope for one service in one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub url: String,
    pub partition_id: String,
    pub signing_region: Option<SigningRegion>,
    pub signing_name: SigningService,
    /// `true` when `signing_name` was derived from the endpoint ID rather than modeled
    pub signing_name_derived: bool,
}

/// Resolve the endpoint of `service` (an endpoint ID such as `lightsail`)
///
/// An explicit `endpoint_override` wins over the regional endpoint; `https://` (or `http://` when
/// `disable_ssl` is set) is prefixed when it has no scheme. Without an override or a region there is
/// no endpoint, and `None` is returned.
pub fn resolve(
    service: &str,
    region: Option<&Region>,
    endpoint_override: Option<&str>,
    disable_ssl: bool,
) -> Option<ResolvedEndpoint> {
    let scheme = if disable_ssl { "http" } else { "https" };
    let partition = region.map(partition_for).unwrap_or(&PARTITIONS[0]);
    let url = match (endpoint_override, region) {
        (Some(endpoint), _) => add_scheme(endpoint, scheme),
        (None, Some(region)) => format!(
            "{}://{}.{}.{}",
            scheme,
            service,
            region.as_ref(),
            partition.dns_suffix
        ),
        (None, None) => return None,
    };
    Some(ResolvedEndpoint {
        url,
        partition_id: partition.id.to_string(),
        signing_region: region.cloned().map(SigningRegion::from),
        signing_name: SigningService::new(service.to_string()),
        signing_name_derived: true,
    })
}

fn add_scheme(endpoint: &str, scheme: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("{}://{}", scheme, endpoint)
    }
}
