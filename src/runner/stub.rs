//! In-process HTTP stub of the service under test, for exercising cases without
//! a real deployment.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    content_type: &'static str,
    body: String,
    delay: Duration,
}

#[derive(Debug, Default)]
struct State {
    routes: HashMap<(String, String), Route>,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

#[derive(Debug, Default)]
pub struct StubBuilder {
    routes: HashMap<(String, String), Route>,
}

impl StubBuilder {
    pub fn route(self, method: &str, path: &str, status: u16, body: Value) -> Self {
        self.delayed_route(method, path, status, body, Duration::ZERO)
    }

    pub fn delayed_route(
        self,
        method: &str,
        path: &str,
        status: u16,
        body: Value,
        delay: Duration,
    ) -> Self {
        self.insert(
            method,
            path,
            Route {
                status,
                content_type: "application/json",
                body: body.to_string(),
                delay,
            },
        )
    }

    /// Serve `body` byte for byte, without JSON encoding.
    pub fn raw_route(self, method: &str, path: &str, status: u16, body: &'static str) -> Self {
        self.insert(
            method,
            path,
            Route {
                status,
                content_type: "text/plain",
                body: body.to_string(),
                delay: Duration::ZERO,
            },
        )
    }

    fn insert(mut self, method: &str, path: &str, route: Route) -> Self {
        self.routes
            .insert((method.to_string(), path.to_string()), route);
        self
    }

    pub async fn start(self) -> StubService {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local addr");
        let state = Arc::new(State {
            routes: self.routes,
            ..State::default()
        });
        let handle = tokio::spawn(serve(listener, Arc::clone(&state)));
        StubService {
            addr,
            state,
            handle,
        }
    }
}

/// Running stub; shuts down when dropped.
pub struct StubService {
    addr: SocketAddr,
    state: Arc<State>,
    handle: JoinHandle<()>,
}

impl StubService {
    pub fn builder() -> StubBuilder {
        StubBuilder::default()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Highest number of requests the stub was serving at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Base URL of a local port with nothing listening on it.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn serve(listener: TcpListener, state: Arc<State>) {
    while let Ok((stream, _)) = listener.accept().await {
        tokio::spawn(handle(stream, Arc::clone(&state)));
    }
}

async fn handle(mut stream: TcpStream, state: Arc<State>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(current, Ordering::SeqCst);

    let route = state
        .routes
        .get(&(request.method.clone(), request.path.clone()))
        .cloned()
        .unwrap_or_else(|| Route {
            status: 404,
            content_type: "application/json",
            body: json!({ "success": false, "error": "Not found" }).to_string(),
            delay: Duration::ZERO,
        });
    state.requests.lock().unwrap().push(request);

    tokio::time::sleep(route.delay).await;

    let reason = if route.status == 200 { "OK" } else { "Stub" };
    let response = format!(
        "HTTP/1.1 {} {reason}\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        route.status,
        route.content_type,
        route.body.len(),
        route.body,
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    state.in_flight.fetch_sub(1, Ordering::SeqCst);
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?;
    let path = target.split('?').next().unwrap_or(target).to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_bytes = &buf[head_end..buf.len().min(head_end + content_length)];
    let body = serde_json::from_slice(body_bytes).unwrap_or(Value::Null);

    Some(RecordedRequest { method, path, body })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Case context pointed at `base_url` with short timeouts.
pub fn context_for(base_url: &str) -> crate::runner::CaseContext {
    let mut config = crate::config::Config::default();
    config.service.base_url = base_url.to_string();
    config.service.request_timeout_ms = 5_000;
    config.service.probe_timeout_ms = 5_000;
    crate::runner::CaseContext::new(config).expect("build case context")
}
