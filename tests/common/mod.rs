//! In-process stand-in for the Pollinations image and text endpoints.

#![allow(dead_code)]

use std::{
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path as UrlPath, RawQuery, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use pollinations_rmcp::{Config, Dispatcher};
use rmcp::model::CallToolResult;
use serde_json::{Value, json};

pub const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-a-png-but-bytes";

#[derive(Default)]
pub struct MockState {
    hits: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

pub struct MockRemote {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockRemote {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let router = Router::new()
            .route("/prompt/{prompt}", get(image))
            .route("/image.png", get(|| async { FAKE_IMAGE.to_vec() }))
            .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/slow.png",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    FAKE_IMAGE.to_vec()
                }),
            )
            .route("/models", get(|| async { Json(json!(["openai", "mistral"])) }))
            .route("/", axum::routing::post(chat))
            .route("/{prompt}", get(text))
            .layer(middleware::from_fn_with_state(state.clone(), record));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `METHOD /path?query` for every request seen, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn dispatcher(&self, download_dir: &Path, probe: bool, timeout_secs: u64) -> Dispatcher {
        let base_url = self.base_url.clone();
        let config = Config::from_lookup(
            |key| match key {
                "POLLINATIONS_IMAGE_BASE_URL" | "POLLINATIONS_TEXT_BASE_URL" => {
                    Some(base_url.clone())
                }
                "PROBE_IMAGE_URLS" => Some(probe.to_string()),
                "REQUEST_TIMEOUT_SECS" => Some(timeout_secs.to_string()),
                _ => None,
            },
            download_dir.to_path_buf(),
        )
        .unwrap();
        Dispatcher::new(&config).unwrap()
    }
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {}", request.method(), request.uri()));
    next.run(request).await
}

async fn image(UrlPath(prompt): UrlPath<String>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    let rejected = prompt == "broken" || (prompt == "forbidden" && query.contains("safe=true"));
    if rejected {
        return (StatusCode::BAD_REQUEST, "rejected").into_response();
    }
    FAKE_IMAGE.to_vec().into_response()
}

async fn text(UrlPath(prompt): UrlPath<String>, RawQuery(query): RawQuery) -> Response {
    let query = query.unwrap_or_default();
    if query.contains("json=true") {
        return Json(json!({"prompt": prompt})).into_response();
    }
    format!("echo: {prompt}").into_response()
}

async fn chat(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({"received": body}))
}

/// The envelope as a caller sees it on the wire.
pub fn envelope(result: &CallToolResult) -> Value {
    serde_json::to_value(result).unwrap()
}

pub fn is_error(result: &CallToolResult) -> bool {
    envelope(result)["isError"].as_bool().unwrap_or(false)
}

pub fn texts(result: &CallToolResult) -> Vec<String> {
    envelope(result)["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|block| {
            assert_eq!(block["type"], "text");
            block["text"].as_str().unwrap().to_string()
        })
        .collect()
}

/// Parses the last text block, where tools put their JSON payload.
pub fn payload(result: &CallToolResult) -> Value {
    let texts = texts(result);
    serde_json::from_str(texts.last().unwrap()).unwrap()
}
