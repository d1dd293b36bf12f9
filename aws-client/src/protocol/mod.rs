/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Wire protocols

pub mod aws_json;

/// Request ID of a response, from `x-amzn-requestid` or `x-amz-request-id`
pub fn extract_request_id(headers: &http::HeaderMap) -> Option<&str> {
    headers
        .get("x-amzn-requestid")
        .or_else(|| headers.get("x-amz-request-id"))
        .and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod test {
    use super::extract_request_id;
    use http::{HeaderMap, HeaderValue};

    #[test]
    fn request_id_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(None, extract_request_id(&headers));

        headers.append("x-amz-request-id", HeaderValue::from_static("other-request-id"));
        assert_eq!(Some("other-request-id"), extract_request_id(&headers));

        headers.append("x-amzn-requestid", HeaderValue::from_static("some-request-id"));
        assert_eq!(Some("some-request-id"), extract_request_id(&headers));
    }
}
