// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use ride_relay::config::Config;
use ride_relay::db::{FirestoreDb, MemoryStore};
use ride_relay::routes::create_router;
use ride_relay::services::{Clock, RideService, StateCodec};
use ride_relay::AppState;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[allow(dead_code)]
pub const PHONE: &str = "+15555558383";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

// ─── Fake ride provider ──────────────────────────────────────────────────────

/// A request as seen by the fake provider.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
}

/// In-process stand-in for the ride provider API.
///
/// Token replies are consumed in order; ride and cost replies are sticky.
#[derive(Clone)]
pub struct FakeProvider {
    requests: Arc<Mutex<Vec<Recorded>>>,
    token_replies: Arc<Mutex<VecDeque<Reply>>>,
    ride_reply: Arc<Mutex<Reply>>,
    cost_reply: Arc<Mutex<Reply>>,
}

#[allow(dead_code)]
impl FakeProvider {
    /// Start the fake provider on an ephemeral port, returning its base URL.
    pub async fn start() -> (Self, String) {
        let fake = Self {
            requests: Arc::default(),
            token_replies: Arc::default(),
            ride_reply: Arc::new(Mutex::new(Reply {
                status: StatusCode::CREATED,
                body: json!({"ride_id": "ride-1", "status": "pending"}),
            })),
            cost_reply: Arc::new(Mutex::new(Reply {
                status: StatusCode::OK,
                body: json!({"cost_estimates": []}),
            })),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let app = axum::Router::new()
            .fallback(handle)
            .with_state(fake.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (fake, format!("http://{addr}"))
    }

    pub fn push_token_reply(&self, status: u16, body: Value) {
        self.token_replies.lock().unwrap().push_back(Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        });
    }

    pub fn set_ride_reply(&self, status: u16, body: Value) {
        *self.ride_reply.lock().unwrap() = Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        };
    }

    pub fn set_cost_reply(&self, status: u16, body: Value) {
        *self.cost_reply.lock().unwrap() = Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        };
    }

    /// All recorded requests to `path`, oldest first.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn handle(State(fake): State<FakeProvider>, request: Request<Body>) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(request.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    fake.requests.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        query,
        authorization,
        body,
    });

    let reply = match path.as_str() {
        "/oauth/token" => fake
            .token_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply {
                status: StatusCode::BAD_REQUEST,
                body: json!({"error": "invalid_grant"}),
            }),
        "/v1/rides" => fake.ride_reply.lock().unwrap().clone(),
        "/v1/cost" => fake.cost_reply.lock().unwrap().clone(),
        _ => Reply {
            status: StatusCode::NOT_FOUND,
            body: json!({"error": "not_found"}),
        },
    };

    (reply.status, Json(reply.body)).into_response()
}

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Settable clock shared with the service under test.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock().unwrap() += chrono::Duration::seconds(secs);
    }

    pub fn as_clock(&self) -> Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().unwrap())
    }
}

// ─── Test app ────────────────────────────────────────────────────────────────

#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub service: RideService,
    pub store: MemoryStore,
    pub provider: FakeProvider,
    pub clock: ManualClock,
}

/// Test configuration pointing at the fake provider.
#[allow(dead_code)]
pub fn test_config(api_base_url: String) -> Config {
    Config {
        api_base_url,
        ..Config::default()
    }
}

/// Build the app against an in-memory store and a fresh fake provider.
#[allow(dead_code)]
pub async fn spawn_app() -> TestApp {
    let (provider, base_url) = FakeProvider::start().await;
    let config = test_config(base_url);
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap());

    let service = RideService::new(&config, Arc::new(store.clone()))
        .expect("ride service")
        .with_clock(clock.as_clock());

    let state = Arc::new(AppState {
        config,
        ride_service: service.clone(),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        service,
        store,
        provider,
        clock,
    }
}

/// Codec keyed the same way as the service built from `config`.
#[allow(dead_code)]
pub fn state_codec(config: &Config) -> StateCodec {
    StateCodec::new(&config.state_secret, config.state_cipher).expect("state codec")
}

/// Expected `Authorization` header on token endpoint calls.
#[allow(dead_code)]
pub fn basic_auth(config: &Config) -> String {
    let raw = format!("{}:{}", config.client_id, config.client_secret);
    format!("Basic {}", BASE64.encode(raw))
}

/// Token reply for a successful authorization code exchange.
#[allow(dead_code)]
pub fn issued_tokens(access: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": "refresh_token",
        "expires_in": 3600
    })
}
