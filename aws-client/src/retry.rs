/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Retry policy for failed attempts

use crate::error::SdkError;
use http::StatusCode;
use std::fmt::Debug;
use std::time::Duration;

/// Decides whether, and after how long, a failed attempt is retried
pub trait Retryer: Send + Sync + Debug {
    /// Maximum number of retries after the initial attempt
    fn max_retries(&self) -> u32;

    fn should_retry(&self, error: &SdkError) -> bool;

    /// Delay before retry number `retry_count` (zero based)
    fn retry_delay(&self, retry_count: u32, error: &SdkError) -> Duration;
}

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const THROTTLE_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottledException",
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestThrottledException",
    "TooManyRequestsException",
    "PriorRequestNotComplete",
    "TransactionInProgressException",
    "EC2ThrottledException",
    "SlowDown",
    "BandwidthLimitExceeded",
];

const RETRYABLE_CODES: &[&str] = &[
    "RequestError",
    "RequestTimeout",
    "RequestTimeoutException",
    "ResponseTimeout",
];

pub fn is_throttle_error(error: &SdkError) -> bool {
    match error.meta() {
        Some(meta) => {
            meta.status == StatusCode::TOO_MANY_REQUESTS
                || meta
                    .code()
                    .map(|code| THROTTLE_CODES.contains(&code))
                    .unwrap_or_default()
        }
        None => false,
    }
}

/// Dispatch failures, 5xx responses (except `501 Not Implemented`), throttling and timeouts
pub fn is_retryable(error: &SdkError) -> bool {
    match error {
        SdkError::ConstructionFailure(_) => false,
        SdkError::DispatchFailure(_) => true,
        SdkError::ResponseError { status, .. } => retryable_status(*status),
        SdkError::ServiceError { meta, .. } => {
            retryable_status(meta.status)
                || is_throttle_error(error)
                || meta
                    .code()
                    .map(|code| RETRYABLE_CODES.contains(&code))
                    .unwrap_or_default()
        }
    }
}

fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED
}

/// Exponential backoff with jitter
///
/// The delay before retry `n` is `min_delay * 2^n` plus up to the same again in jitter, capped at
/// `max_delay`. Throttling errors use `min_throttle_delay` as the base instead.
#[derive(Debug, Clone)]
pub struct DefaultRetryer {
    max_retries: u32,
    min_delay: Duration,
    min_throttle_delay: Duration,
    max_delay: Duration,
    base: fn() -> f64,
}

impl Default for DefaultRetryer {
    fn default() -> Self {
        DefaultRetryer {
            max_retries: DEFAULT_MAX_RETRIES,
            min_delay: Duration::from_millis(30),
            min_throttle_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(300),
            // by default, use a random base for the jitter
            base: fastrand::f64,
        }
    }
}

impl DefaultRetryer {
    pub fn new(max_retries: u32) -> Self {
        DefaultRetryer {
            max_retries,
            ..Default::default()
        }
    }

    /// For deterministic tests, replace the random jitter base
    pub fn with_static_base(mut self, base: fn() -> f64) -> Self {
        self.base = base;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }
}

impl Retryer for DefaultRetryer {
    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn should_retry(&self, error: &SdkError) -> bool {
        is_retryable(error)
    }

    fn retry_delay(&self, retry_count: u32, error: &SdkError) -> Duration {
        let min_delay = if is_throttle_error(error) {
            self.min_throttle_delay
        } else {
            self.min_delay
        };
        let backoff = min_delay.saturating_mul(1 << retry_count.min(30));
        let jitter = backoff.mul_f64((self.base)().clamp(0.0, 1.0));
        backoff.saturating_add(jitter).min(self.max_delay)
    }
}
