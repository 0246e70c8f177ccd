//! Minimal HTTP/1.1 responder on a loopback port for client tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A canned response for requests whose target starts with `prefix`.
#[derive(Debug, Clone)]
pub(crate) struct Route {
    pub prefix: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(prefix: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self {
            prefix,
            status,
            body: body.into(),
        }
    }
}

/// Serve `routes` until the test runtime shuts down; returns the base URL.
/// Unmatched targets get a 404 with an empty body.
pub(crate) async fn serve(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0;
                while read < buf.len() {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]);
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|r| target.starts_with(r.prefix))
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, String::new()));
                let response = format!(
                    "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

/// A loopback URL nothing listens on.
pub(crate) async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
