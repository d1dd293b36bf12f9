/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use aws_client::corehandlers;
use aws_client::os::{Env, Fs};
use aws_client::protocol::aws_json::{self, TypedErrors};
use aws_client::sign::sign_request_handler;
use aws_client::test_connection::TestConnection;
use aws_client::{Client, ClientInfo, Config, ConfigProvider, LogLevel, Operation, Session};
use std::collections::HashMap;
use std::time::{Duration, UNIX_EPOCH};

const CONFIG: &str = "[default]\nregion = us-west-2\n\n[profile other]\nregion = eu-north-1\n";
const CREDENTIALS: &str =
    "[default]\naws_access_key_id = AKIDPROFILE\naws_secret_access_key = SECRET\n";

fn profile_fs() -> Fs {
    let mut files = HashMap::new();
    files.insert("/home/user/.aws/config".to_string(), CONFIG.as_bytes().to_vec());
    files.insert(
        "/home/user/.aws/credentials".to_string(),
        CREDENTIALS.as_bytes().to_vec(),
    );
    Fs::from_map(files)
}

fn json_client(session: &Session, overrides: &[Config]) -> Client {
    let resolved = session.client_config("svc", overrides);
    let mut info = ClientInfo::new("svc", "Svc", "2021-01-01");
    info.json_version = "1.0".into();
    info.target_prefix = "Svc_20210101".into();
    info.signing_name = Some(resolved.signing_name);
    info.signing_region = resolved.signing_region;
    info.partition_id = resolved.partition_id;
    info.endpoint = resolved.endpoint;
    let mut client = Client::new(resolved.config, info, resolved.handlers);
    let handlers = client.handlers_mut();
    handlers.sign.push_back(sign_request_handler());
    handlers.build.push_back(aws_json::build_handler());
    handlers.unmarshal.push_back(aws_json::unmarshal_handler());
    handlers
        .unmarshal_meta
        .push_back(aws_json::unmarshal_meta_handler());
    handlers
        .unmarshal_error
        .push_back(aws_json::unmarshal_error_handler(TypedErrors::new()));
    client
}

#[tokio::test]
async fn profile_configured_call() {
    let conn = TestConnection::new(vec![http::Response::builder()
        .status(200)
        .header("x-amzn-requestid", "abc-123")
        .body(r#"{"Items":["a","b"]}"#)
        .unwrap()]);
    let env = Env::from_slice(&[("HOME", "/home/user")]);
    let config = Config::load_from(&env, &profile_fs())
        .to_builder()
        .connector(conn.clone())
        .log_level(LogLevel::DebugWithHttpBody)
        .build();
    let session = Session::new(config);
    let client = json_client(&session, &[]);
    assert_eq!(
        client.handlers().send.names(),
        vec![
            corehandlers::LOG_HTTP_REQUEST,
            corehandlers::SEND_HANDLER,
            corehandlers::LOG_HTTP_RESPONSE
        ]
    );

    let mut request = client.new_request(
        Operation::new("ListItems"),
        serde_json::json!({"Limit": 2}),
    );
    request.set_time(UNIX_EPOCH + Duration::from_secs(1614952162));
    let output = request.send().await.expect("success");
    assert_eq!(output.data, serde_json::json!({"Items": ["a", "b"]}));
    assert_eq!(output.request_id.as_deref(), Some("abc-123"));

    let requests = conn.requests();
    let sent = &requests[0];
    assert_eq!(sent.uri(), "https://svc.us-west-2.amazonaws.com/");
    assert_eq!(sent.headers()["content-type"], "application/x-amz-json-1.0");
    assert_eq!(sent.headers()["x-amz-target"], "Svc_20210101.ListItems");
    let auth = sent.headers()["authorization"].to_str().unwrap();
    assert!(
        auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDPROFILE/20210305/us-west-2/svc/"),
        "{}",
        auth
    );
    assert!(sent.headers()["user-agent"]
        .to_str()
        .unwrap()
        .starts_with("aws-client-rust/"));
}

#[test]
fn selected_profile_and_env_region() {
    let env = Env::from_slice(&[("HOME", "/home/user"), ("AWS_PROFILE", "other")]);
    let config = Config::load_from(&env, &profile_fs());
    assert_eq!(config.region().map(|r| r.as_ref()), Some("eu-north-1"));

    let env = Env::from_slice(&[
        ("HOME", "/home/user"),
        ("AWS_PROFILE", "other"),
        ("AWS_DEFAULT_REGION", "sa-east-1"),
    ]);
    let config = Config::load_from(&env, &profile_fs());
    assert_eq!(config.region().map(|r| r.as_ref()), Some("sa-east-1"));
}

#[tokio::test(start_paused = true)]
async fn dispatch_failures_are_retried() {
    let conn = TestConnection::new(Vec::<http::Response<&'static str>>::new());
    let session = Session::new(
        Config::builder()
            .region(aws_client::Region::new("us-east-1"))
            .credentials_provider(aws_client::Credentials::from_keys("AKID", "SECRET", None))
            .connector(conn.clone())
            .max_retries(2)
            .build(),
    );
    let client = json_client(&session, &[]);
    let err = client
        .new_request(Operation::new("ListItems"), serde_json::Value::Null)
        .send()
        .await
        .expect_err("no responses");
    assert!(matches!(err, aws_client::SdkError::DispatchFailure(_)));
    assert_eq!(conn.requests().len(), 3);
}
