/*!
Stub actuator for agent tests

Small axum server on an ephemeral local port answering scripted bodies per
path (`/metrics`, `/health`, `/info`...). Unscripted paths answer 404.
*/

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::fixtures;

#[derive(Debug, Clone)]
struct StubResponse {
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<String, StubResponse>>,
    hits: Mutex<HashMap<String, usize>>,
}

pub struct StubActuator {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubActuator {
    /// Bind 127.0.0.1 on a free port and start serving
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(StubState::default());

        let app = Router::new().fallback(answer).with_state(state.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                log::warn!("stub actuator stopped: {}", e);
            }
        });

        log::info!("stub actuator listening on http://{}", addr);
        Ok(Self {
            addr,
            state,
            server,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.state.routes.lock().unwrap().insert(
            path.to_string(),
            StubResponse {
                status,
                body: body.into(),
            },
        );
    }

    pub fn respond_json(&self, path: &str, body: &Value) {
        self.respond(path, 200, body.to_string());
    }

    /// Serve the sample bodies from `fixtures` on the three actuator paths
    pub fn serve_defaults(&self) {
        self.respond_json("/metrics", &fixtures::metrics());
        self.respond_json("/health", &fixtures::health());
        self.respond_json("/info", &fixtures::info());
    }

    /// Requests received on `path`, scripted or not
    pub fn hits(&self, path: &str) -> usize {
        self.state.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

impl Drop for StubActuator {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn answer(State(state): State<Arc<StubState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    *state.hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let scripted = state.routes.lock().unwrap().get(&path).cloned();
    match scripted {
        Some(stub) => (
            stub.status,
            [(header::CONTENT_TYPE, "application/json")],
            stub.body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
