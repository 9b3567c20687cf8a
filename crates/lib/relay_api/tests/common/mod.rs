//! Shared helpers: throwaway upstream servers and a request driver.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE};
use tower::ServiceExt;

/// What a fake upstream saw.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<AtomicUsize>,
    headers: Arc<Mutex<Option<HeaderMap>>>,
    body: Arc<Mutex<Option<serde_json::Value>>>,
}

impl Recorder {
    pub fn record(&self, headers: &HeaderMap, body: &[u8]) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.headers.lock().unwrap() = Some(headers.clone());
        *self.body.lock().unwrap() = serde_json::from_slice(body).ok();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn body(&self) -> Option<serde_json::Value> {
        self.body.lock().unwrap().clone()
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

/// A URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/chat")
}

pub fn chat_body() -> String {
    serde_json::json!({
        "history": [
            {"role": "system", "content": "Você é uma assistente simpática."},
            {"role": "user", "content": "Fale sobre cozinhas comunitárias"}
        ]
    })
    .to_string()
}

/// Sends one request through the router and returns status, headers and JSON body.
pub async fn call(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: String,
) -> (StatusCode, HeaderMap, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let req = builder.body(Body::from(body)).unwrap();

    let resp = app.oneshot(req).await.expect("request");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        panic!(
            "body is not JSON: {}",
            String::from_utf8_lossy(&bytes)
        )
    });
    (status, headers, json)
}
