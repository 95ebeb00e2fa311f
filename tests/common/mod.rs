use std::net::SocketAddr;

use axum::{
    extract::Multipart,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use base64::Engine;
use serde_json::{json, Map, Value};

/// Serves `router` on an ephemeral localhost port.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A localhost address nothing listens on.
pub fn refused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Answers one request with `status` and a body cut short of its Content-Length.
pub async fn spawn_truncated(status_line: &'static str) -> SocketAddr {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: 100\r\n\r\npartial",
            status_line
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.ok();
    });
    addr
}

pub async fn echo(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

pub async fn inspect(headers: HeaderMap) -> Json<Value> {
    let get = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "authorization": get(header::AUTHORIZATION),
        "content_type": get(header::CONTENT_TYPE),
        "host": get(header::HOST),
    }))
}

pub async fn reject() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, r#"{"error":"invalid label"}"#)
}

pub async fn explode() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "triplestore unavailable")
}

/// Answers with every multipart field: file name, content type and base64 bytes.
pub async fn capture(mut multipart: Multipart) -> Json<Value> {
    let mut parts = Map::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap();
        parts.insert(
            name,
            json!({
                "file_name": file_name,
                "content_type": content_type,
                "base64": base64::engine::general_purpose::STANDARD.encode(&bytes),
            }),
        );
    }
    Json(Value::Object(parts))
}

pub fn decode(value: &Value) -> Vec<u8> {
    base64::engine::general_purpose::STANDARD
        .decode(value.as_str().unwrap())
        .unwrap()
}
