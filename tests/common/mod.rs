//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use azure_chat_proxy::config::TransportConfig;
use azure_chat_proxy::Transport;

/// One request as the mock backend saw it.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub received_at: Instant,
}

impl CapturedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case(name)).count()
    }
}

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Accepted TCP connections, whether or not a request was parsed.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> CapturedRequest {
        self.requests().pop().expect("backend received no request")
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// `f` sees each parsed request and answers with `(status, body)`. Every
/// response closes the connection.
pub async fn start_programmable_backend<F, Fut, B>(f: F) -> MockBackend
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, B)> + Send + 'static,
    B: Into<Vec<u8>> + Send + 'static,
{
    serve(f, false).await
}

/// Like [`start_programmable_backend`], but connections stay open for
/// further requests.
pub async fn start_keep_alive_backend<F, Fut, B>(f: F) -> MockBackend
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, B)> + Send + 'static,
    B: Into<Vec<u8>> + Send + 'static,
{
    serve(f, true).await
}

/// Start a backend that always answers `status` with `body`.
pub async fn start_mock_backend(status: u16, body: &'static str) -> MockBackend {
    start_programmable_backend(move |_| async move { (status, body) }).await
}

/// Start a backend that always answers `status` with raw `body` bytes.
pub async fn start_bytes_backend(status: u16, body: &'static [u8]) -> MockBackend {
    start_programmable_backend(move |_| async move { (status, body) }).await
}

/// Start a backend that echoes the request body with 200.
pub async fn start_echo_backend() -> MockBackend {
    start_programmable_backend(|req| async move { (200, req.body) }).await
}

/// Transport that ignores proxy environment variables.
pub fn test_transport() -> Transport {
    Transport::new(&TransportConfig {
        use_env_proxy: false,
        request_timeout_secs: 10,
        ..TransportConfig::default()
    })
    .unwrap()
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn serve<F, Fut, B>(f: F, keep_alive: bool) -> MockBackend
where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, B)> + Send + 'static,
    B: Into<Vec<u8>> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = MockBackend {
        addr: listener.local_addr().unwrap(),
        connections: Arc::new(AtomicUsize::new(0)),
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let f = Arc::new(f);

    let state = backend.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    state.connections.fetch_add(1, Ordering::SeqCst);
                    let f = f.clone();
                    let requests = state.requests.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, requests, f, keep_alive).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    backend
}

async fn handle_connection<F, Fut, B>(
    mut socket: TcpStream,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    f: Arc<F>,
    keep_alive: bool,
) where
    F: Fn(CapturedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, B)> + Send + 'static,
    B: Into<Vec<u8>> + Send + 'static,
{
    let mut buf = Vec::new();
    loop {
        let Some(request) = read_request(&mut socket, &mut buf).await else {
            return;
        };
        requests.lock().unwrap().push(request.clone());

        let (status, body) = f(request).await;
        let body: Vec<u8> = body.into();
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: {}\r\n\r\n",
            status,
            reason_phrase(status),
            body.len(),
            if keep_alive { "keep-alive" } else { "close" }
        );
        if socket.write_all(head.as_bytes()).await.is_err() || socket.write_all(&body).await.is_err() {
            return;
        }
        if !keep_alive {
            let _ = socket.shutdown().await;
            return;
        }
    }
}

/// Parse one request from `socket`, keeping any bytes past it in `buf`.
async fn read_request(socket: &mut TcpStream, buf: &mut Vec<u8>) -> Option<CapturedRequest> {
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(buf, b"\r\n\r\n") {
            break pos;
        }
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };
    let received_at = Instant::now();

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[body_start..body_start + content_length]).into_owned();
    buf.drain(..body_start + content_length);

    Some(CapturedRequest {
        method,
        path,
        headers,
        body,
        received_at,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
