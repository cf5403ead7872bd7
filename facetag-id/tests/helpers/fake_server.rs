//! Scriptable HTTP server for integration tests
//!
//! Binds to 127.0.0.1:0, answers each path with a scripted reply and records
//! every request it receives.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How the server answers a path
#[derive(Debug, Clone)]
pub enum Reply {
    /// Fixed status and body, optionally after a delay
    Fixed {
        status: u16,
        body: String,
        delay: Duration,
    },
    /// JSON description of the request that was received
    Echo,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Fixed {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Fixed {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(delay: Duration, body: impl Into<String>) -> Self {
        Reply::Fixed {
            status: 200,
            body: body.into(),
            delay,
        }
    }
}

/// One request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub received_at: Instant,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct ServerState {
    routes: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Handle to a running fake server
#[derive(Clone)]
pub struct FakeServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

impl FakeServer {
    /// Start serving on an ephemeral port
    pub async fn start() -> Self {
        let state = Arc::new(ServerState::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self { addr, state }
    }

    /// `http://127.0.0.1:<port><path>`
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Script the reply for an exact path
    pub fn route(&self, path: &str, reply: Reply) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests whose path ends with `suffix`
    pub fn requests_to(&self, suffix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();

    let recorded = RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        headers: headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_ascii_lowercase(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: body.to_vec(),
        received_at: Instant::now(),
    };
    state.requests.lock().unwrap().push(recorded);

    let reply = state.routes.lock().unwrap().get(&path).cloned();

    match reply {
        Some(Reply::Fixed {
            status,
            body,
            delay,
        }) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, body).into_response()
        }
        Some(Reply::Echo) => {
            let echo = json!({
                "method": method.to_string(),
                "path": uri.path_and_query().map(|p| p.as_str()).unwrap_or(""),
                "content_type": headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok()),
                "body": String::from_utf8_lossy(&body),
            });
            (StatusCode::OK, echo.to_string()).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("no route for {}", path)).into_response(),
    }
}
