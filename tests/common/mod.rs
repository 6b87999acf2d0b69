//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jira_gateway::config::{GatewayConfig, RetryConfig};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

pub const API_KEY: &str = "test-key";

/// A request seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub target: String,
    pub body: String,
}

/// Programmable HTTP backend standing in for Jira or a webhook receiver.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Start a backend on an ephemeral port. `respond` maps each recorded
/// request (and its 0-based sequence number) to a status and JSON body.
pub async fn start_mock_backend<F>(respond: F) -> MockBackend
where
    F: Fn(usize, &Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let respond = Arc::new(respond);

    let recorded = requests.clone();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let recorded = recorded.clone();
            let respond = respond.clone();
            tokio::spawn(async move {
                handle_connection(socket, recorded, respond).await;
            });
        }
    });

    MockBackend { addr, requests }
}

/// Backend that answers every request with the same JSON.
pub async fn start_static_backend(status: u16, body: Value) -> MockBackend {
    let body = body.to_string();
    start_mock_backend(move |_, _| (status, body.clone())).await
}

async fn handle_connection<F>(
    mut socket: TcpStream,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    respond: Arc<F>,
) where
    F: Fn(usize, &Recorded) -> (u16, String) + Send + Sync + 'static,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
    let request = Recorded {
        method: request_line.next().unwrap_or_default().to_string(),
        target: request_line.next().unwrap_or_default().to_string(),
        body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
    };

    let seq = {
        let mut all = recorded.lock().unwrap();
        all.push(request.clone());
        all.len() - 1
    };
    let (status, body) = respond(seq, &request);
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Gateway config pointing at `jira_url`, with retries off.
pub fn test_config(jira_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.jira.base_url = jira_url.to_string();
    config.jira.email = "bot@acme.io".into();
    config.jira.api_token = "jira-secret-token".into();
    config.auth.api_keys = vec![API_KEY.into()];
    config.retries = RetryConfig {
        enabled: false,
        ..RetryConfig::default()
    };
    config
}

/// POST a JSON-RPC body to `/mcp` with the test credential.
pub async fn post_mcp(router: &Router, body: Value) -> (StatusCode, Value) {
    post_mcp_with_auth(router, body, Some(API_KEY)).await
}

pub async fn post_mcp_with_auth(
    router: &Router,
    body: Value,
    key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {}", key));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Call a tool and return `(is_error, texts)`.
pub async fn call_tool(router: &Router, name: &str, arguments: Value) -> (bool, Vec<String>) {
    let (status, body) = post_mcp(
        router,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "unexpected status, body: {}", body);

    let result = &body["result"];
    let texts = result["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["text"].as_str().unwrap().to_string())
        .collect();
    (result["isError"].as_bool().unwrap(), texts)
}

/// A Jira board-issue response body.
pub fn issues_body(issues: &[(&str, &str, &str)]) -> Value {
    let issues: Vec<Value> = issues
        .iter()
        .map(|(key, summary, issue_type)| {
            json!({
                "key": key,
                "fields": {
                    "summary": summary,
                    "status": {"name": "Done"},
                    "issuetype": {"name": issue_type},
                    "resolutiondate": "2026-10-15T09:00:00.000+0000"
                }
            })
        })
        .collect();
    json!({ "startAt": 0, "maxResults": 100, "total": issues.len(), "issues": issues })
}

/// Value of a query parameter in a request target, undecoded.
pub fn query_param<'a>(target: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = target.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Backend paging `total` closed issues `page_size` at a time, honouring
/// the `startAt` query parameter.
pub async fn start_paging_backend(total: usize, page_size: usize) -> MockBackend {
    start_mock_backend(move |_, request| {
        let start = query_param(&request.target, "startAt")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let issues: Vec<Value> = (start..(start + page_size).min(total))
            .map(|n| {
                json!({
                    "key": format!("OPS-{}", n + 1),
                    "fields": {
                        "summary": format!("Item {}", n + 1),
                        "status": {"name": "Done"},
                        "issuetype": {"name": "Task"}
                    }
                })
            })
            .collect();
        let body = json!({
            "startAt": start,
            "maxResults": page_size,
            "total": total,
            "issues": issues,
        });
        (200, body.to_string())
    })
    .await
}
