#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use url::Url;

use org_console::api::ApiClient;
use org_console::console::Console;
use org_console::guard::RouteGuard;
use org_console::session::SessionStore;

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
enum Body {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    body: Body,
    delay: Option<Duration>,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), VecDeque<Canned>>>,
    requests: Mutex<Vec<Recorded>>,
}

/// In-process stand-in for the administration API.
///
/// Responses are queued per method and path (query excluded). The last
/// queued response for a route repeats; unknown routes answer 404 `{}`.
pub struct MockApi {
    pub port: u16,
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind mock api")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, state })
    }

    fn push(&self, method: Method, path: &str, canned: Canned) {
        self.state
            .routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(canned);
    }

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.push(method, path, Canned { status, body: Body::Json(body), delay: None });
        self
    }

    pub fn on_text(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Canned { status, body: Body::Text(body.to_string()), delay: None });
        self
    }

    pub fn on_delayed(&self, method: Method, path: &str, status: u16, body: Value, delay: Duration) -> &Self {
        self.push(method, path, Canned { status, body: Body::Json(body), delay: Some(delay) });
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(Url::parse(&self.base_url).unwrap())
    }

    /// Console wired to this server with an in-memory session.
    pub fn console(&self, token: Option<&str>) -> Console {
        let session = SessionStore::in_memory();
        session.set_token(token.map(str::to_string)).unwrap();
        Console::new(self.client(), session, RouteGuard::default())
    }
}

async fn respond(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    let canned = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&(method, uri.path().to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };

    let Some(canned) = canned else {
        return (StatusCode::NOT_FOUND, axum::Json(serde_json::json!({}))).into_response();
    };

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match canned.body {
        Body::Json(value) => (status, axum::Json(value)).into_response(),
        Body::Text(text) => (status, text).into_response(),
    }
}
