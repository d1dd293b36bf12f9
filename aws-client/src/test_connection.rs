/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::body::SdkBody;
use crate::connector::{Connector, ConnectorFuture};
use crate::error::BoxError;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A connection that replays canned responses
///
/// It will:
/// - respond to requests with a preloaded series of responses, in order
/// - record requests for future examination
///
/// Once the responses are exhausted, further requests fail with a dispatch error.
/// ```rust
/// use aws_client::test_connection::TestConnection;
/// let conn = TestConnection::new(vec![http::Response::builder()
///     .status(200)
///     .body("{}")
///     .unwrap()]);
/// let config = aws_client::Config::builder().connector(conn.clone()).build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TestConnection {
    responses: Arc<Mutex<VecDeque<http::Response<Bytes>>>>,
    requests: Arc<Mutex<Vec<http::Request<SdkBody>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TestConnection {
    pub fn new<B: Into<Bytes>>(responses: impl IntoIterator<Item = http::Response<B>>) -> Self {
        TestConnection {
            responses: Arc::new(Mutex::new(
                responses
                    .into_iter()
                    .map(|response| response.map(Into::into))
                    .collect(),
            )),
            requests: Default::default(),
        }
    }

    /// Requests received so far, in the order they were sent.
    pub fn requests(&self) -> MutexGuard<'_, Vec<http::Request<SdkBody>>> {
        lock(&self.requests)
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

impl Connector for TestConnection {
    fn call(&self, request: http::Request<SdkBody>) -> ConnectorFuture {
        lock(&self.requests).push(request);
        let response: Result<_, BoxError> = lock(&self.responses)
            .pop_front()
            .ok_or_else(|| "no more test responses".into());
        Box::pin(std::future::ready(response))
    }
}
