//! One-shot HTTP/1.1 server on a loopback port, for driving the real
//! reqwest-based clients in tests.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request as the server received it.
#[derive(Debug)]
pub(crate) struct Captured {
    /// e.g. `POST /api/v1/chat/completions HTTP/1.1`
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Captured {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The canned answer. Parts after the first are written `gap` apart.
pub(crate) struct Reply {
    status: u16,
    content_type: &'static str,
    parts: Vec<Vec<u8>>,
    gap: Duration,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            parts: vec![body.into()],
            gap: Duration::ZERO,
        }
    }

    pub fn json(status: u16, body: &str) -> Self {
        Self::new(status, "application/json", body)
    }

    pub fn sse(body: &str) -> Self {
        Self::new(200, "text/event-stream", body)
    }

    pub fn trickled(content_type: &'static str, parts: Vec<Vec<u8>>, gap: Duration) -> Self {
        Self {
            status: 200,
            content_type,
            parts,
            gap,
        }
    }
}

/// Accepts a single connection, records the request and sends the reply.
pub(crate) struct TestServer {
    pub url: String,
    handle: JoinHandle<Captured>,
}

impl TestServer {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let captured = read_request(&mut socket).await;
            write_reply(&mut socket, reply).await;
            captured
        });
        Self {
            url: format!("http://{addr}"),
            handle,
        }
    }

    /// The request the server saw. Waits for the reply to be written.
    pub async fn request(self) -> Captured {
        self.handle.await.unwrap()
    }
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before the request head");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Captured {
        request_line,
        headers,
        body,
    }
}

async fn write_reply(socket: &mut TcpStream, reply: Reply) {
    let length: usize = reply.parts.iter().map(Vec::len).sum();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reason(reply.status),
        reply.content_type,
        length
    );
    // The client may hang up early (error statuses, timeouts).
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    for (i, part) in reply.parts.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(reply.gap).await;
        }
        if socket.write_all(part).await.is_err() || socket.flush().await.is_err() {
            return;
        }
    }
    let _ = socket.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
