//! Drives `PollinationsServer` through a real MCP client over an in-memory
//! pipe, so the rmcp handler wiring is covered and not just the dispatcher.

mod common;

use std::{path::Path, sync::Arc};

use pollinations_rmcp::PollinationsServer;
use rmcp::{
    RoleClient, ServiceError, ServiceExt,
    model::{CallToolRequestParams, ErrorCode},
    service::RunningService,
};
use serde_json::{Value, json};

use common::{MockRemote, is_error, payload, texts};

const TIMEOUT_SECS: u64 = 30;

async fn connect(remote: &MockRemote, download_dir: &Path) -> RunningService<RoleClient, ()> {
    let (server_io, client_io) = tokio::io::duplex(4096);
    let server = PollinationsServer::new(Arc::new(remote.dispatcher(
        download_dir,
        false,
        TIMEOUT_SECS,
    )));
    tokio::spawn(async move {
        let running = server.serve(server_io).await?;
        running.waiting().await?;
        anyhow::Ok(())
    });
    ().serve(client_io).await.unwrap()
}

fn call(name: &str, arguments: Value) -> CallToolRequestParams {
    CallToolRequestParams {
        meta: None,
        name: name.to_string().into(),
        arguments: arguments.as_object().cloned(),
        task: None,
    }
}

#[tokio::test]
async fn catalog_lists_every_tool_with_its_schema() {
    let remote = MockRemote::start().await;
    let temp = tempfile::tempdir().unwrap();
    let client = connect(&remote, temp.path()).await;

    let tools = client.list_all_tools().await.unwrap();
    let mut names: Vec<_> = tools.iter().map(|tool| tool.name.to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        [
            "download_image",
            "generate_chat",
            "generate_image",
            "generate_text",
            "list_text_models",
        ]
    );

    let generate_image = tools
        .iter()
        .find(|tool| tool.name == "generate_image")
        .unwrap();
    let properties = generate_image.input_schema["properties"].as_object().unwrap();
    assert!(properties.contains_key("prompt"));
    assert!(properties.contains_key("safe"));

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn generate_image_succeeds_over_the_protocol() {
    let remote = MockRemote::start().await;
    let temp = tempfile::tempdir().unwrap();
    let client = connect(&remote, temp.path()).await;

    let result = client
        .call_tool(call("generate_image", json!({"prompt": "red fox", "seed": 7})))
        .await
        .unwrap();

    assert!(!is_error(&result));
    let payload = payload(&result);
    assert!(payload["url"].as_str().unwrap().contains("/prompt/red%20fox"));
    assert_eq!(payload["seed"], 7);
    assert_eq!(remote.hits(), 0);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn wrongly_typed_prompt_is_a_tool_error() {
    let remote = MockRemote::start().await;
    let temp = tempfile::tempdir().unwrap();
    let client = connect(&remote, temp.path()).await;

    let result = client
        .call_tool(call("generate_image", json!({"prompt": 123})))
        .await
        .unwrap();

    assert!(is_error(&result));
    let text = &texts(&result)[0];
    assert!(text.contains("prompt"));
    assert!(text.ends_with("(状态码: 400)"));
    assert_eq!(remote.hits(), 0);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn unknown_tool_is_method_not_found_over_the_protocol() {
    let remote = MockRemote::start().await;
    let temp = tempfile::tempdir().unwrap();
    let client = connect(&remote, temp.path()).await;

    let err = client
        .call_tool(call("nonexistent_tool", json!({})))
        .await
        .unwrap_err();

    match err {
        ServiceError::McpError(err) => {
            assert_eq!(err.code, ErrorCode::METHOD_NOT_FOUND);
            assert!(err.message.contains("nonexistent_tool"));
        }
        other => panic!("expected an MCP error, got {other:?}"),
    }
    assert_eq!(remote.hits(), 0);

    client.cancel().await.unwrap();
}
