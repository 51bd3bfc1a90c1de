//! Liveness HTTP endpoint.
//!
//! Minimal single-purpose server: any request on the configured port gets
//! a JSON liveness report. Supervisors only need a 200 and three fields,
//! so no web framework is involved.

use anyhow::Result;
use log::{debug, error, info};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    uptime_secs: u64,
    gateway_connected: bool,
}

/// Shared liveness state. The gateway flag is flipped by the ready/resume
/// events in the bot's event handler.
pub struct HealthState {
    start: Instant,
    gateway_connected: AtomicBool,
}

impl HealthState {
    pub fn new() -> Arc<Self> {
        Arc::new(HealthState {
            start: Instant::now(),
            gateway_connected: AtomicBool::new(false),
        })
    }

    pub fn set_gateway_connected(&self, connected: bool) {
        self.gateway_connected.store(connected, Ordering::Relaxed);
    }

    fn report(&self) -> HealthReport {
        HealthReport {
            status: "ok",
            uptime_secs: self.start.elapsed().as_secs(),
            gateway_connected: self.gateway_connected.load(Ordering::Relaxed),
        }
    }
}

/// Bind the listener and serve liveness responses until the process exits.
pub async fn serve(state: Arc<HealthState>, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Health endpoint listening on port {port}");

    loop {
        match listener.accept().await {
            Ok((mut stream, peer)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    debug!("Health check from {peer}");
                    // Drain whatever request line arrived; the response is
                    // the same regardless.
                    let mut buf = [0u8; 1024];
                    let _ = stream.read(&mut buf).await;

                    let body = match serde_json::to_string(&state.report()) {
                        Ok(body) => body,
                        Err(e) => {
                            error!("Failed to serialize health report: {e}");
                            return;
                        }
                    };
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    if let Err(e) = stream.write_all(response.as_bytes()).await {
                        debug!("Failed to write health response: {e}");
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept health connection: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_reflects_gateway_flag() {
        let state = HealthState::new();
        assert!(!state.report().gateway_connected);

        state.set_gateway_connected(true);
        assert!(state.report().gateway_connected);

        state.set_gateway_connected(false);
        assert!(!state.report().gateway_connected);
    }

    #[test]
    fn test_report_serializes() {
        let state = HealthState::new();
        let json = serde_json::to_string(&state.report()).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("uptime_secs"));
    }

    #[tokio::test]
    async fn test_serve_answers_http() {
        let state = HealthState::new();
        state.set_gateway_connected(true);

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            let _ = serve(server_state, port).await;
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream.write_all(b"GET /health HTTP/1.1\r\n\r\n").await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        let text = String::from_utf8_lossy(&response);

        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.contains("\"gateway_connected\":true"));
    }
}
