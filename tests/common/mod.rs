//! Shared test helpers: an in-process mock of the Sequence API.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<String, (u16, String)>>>,
}

/// Mock Sequence API bound to a random local port.
pub struct MockSequence {
    pub base_url: String,
    state: MockState,
}

impl MockSequence {
    pub async fn start() -> Self {
        let state = MockState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Serve `body` with `status` for POSTs to `path`.
    pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.into()));
    }

    pub fn respond_json(&self, path: &str, status: u16, body: Value) {
        self.respond(path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        headers,
        body,
    });

    let configured = state.responses.lock().unwrap().get(&path).cloned();
    let (status, body) = configured.unwrap_or_else(|| {
        (
            404,
            json!({"code": "NOT_FOUND", "message": format!("no mock for {}", path)}).to_string(),
        )
    });

    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

// =============================================================================
// Fixtures
// =============================================================================

pub const ACCOUNTS_PATH: &str = "/accounts";

pub fn trigger_path(rule_id: &str) -> String {
    format!("/remote-api/rules/{}/trigger", rule_id)
}

pub fn sample_accounts_response() -> Value {
    json!({
        "message": "OK",
        "requestId": "f1a2b3c4-56d7-890e-fgh1-XXXXXXXXXXXX",
        "data": {
            "accounts": [
                {
                    "id": "5579244",
                    "name": "Main Operating Pod",
                    "balance": {"amountInDollars": 25342.77, "error": null},
                    "type": "Pod"
                },
                {
                    "id": "5579245",
                    "name": "Client Payments Account",
                    "balance": {"amountInDollars": 10200.50, "error": null},
                    "type": "Income Source"
                },
                {
                    "id": "QDBZQjj1lohgeqVWJlnmf5lA4g83ZGCwl3Qx4",
                    "name": "Chase Credit Card",
                    "balance": {"amountInDollars": 137.9, "error": null},
                    "type": "Account"
                }
            ],
            "errors": []
        }
    })
}

pub fn sample_trigger_response() -> Value {
    json!({
        "code": "OK",
        "message": "Rule with id ru_12345 has been triggered",
        "data": {"requestId": "b28f1d9e-8c2a-4d3e-9af1-XXXXXXXXXXXX"}
    })
}

pub fn unauthorized_token_response() -> Value {
    json!({"code": "INVALID_ACCESS_TOKEN", "message": "Unauthorized"})
}

pub fn invalid_secret_response() -> Value {
    json!({"code": "INVALID_API_SECRET", "message": "Unauthorized"})
}

pub fn rate_limit_response() -> Value {
    json!({
        "code": "TOO_MANY_REQUESTS",
        "message": "Rule with id ru_12345 has been triggered too many times. Please try again later."
    })
}
