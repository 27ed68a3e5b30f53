#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use cx_dashboard::pages::PageContext;
use cx_dashboard::services::{History, Route};
use cx_dashboard::Config;

/// Knobs and counters for the fake CX backend.
#[derive(Default)]
pub struct BackendState {
    pub logged_in: AtomicBool,
    pub status_fails: AtomicBool,
    pub status_malformed: AtomicBool,
    pub status_delay_ms: AtomicU64,
    pub google_connected: AtomicBool,
    pub google_status_fails: AtomicBool,
    pub sync_fails: AtomicBool,
    pub sync_inserted: AtomicU64,
    pub fail_analysis: AtomicBool,
    pub analysis_delay_ms: AtomicU64,
    pub cx_delay_ms: AtomicU64,

    pub status_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub analysis_calls: AtomicUsize,
    pub cx_calls: AtomicUsize,
    pub trend_calls: AtomicUsize,
    pub sync_calls: AtomicUsize,

    pub uploaded: Mutex<Option<(String, Vec<u8>)>>,
    pub cx_response: Mutex<Value>,
    pub last_cx_query: Mutex<HashMap<String, String>>,
    pub last_trend_query: Mutex<HashMap<String, String>>,
    pub last_sync_query: Mutex<HashMap<String, String>>,
}

impl BackendState {
    pub fn logged_in() -> Arc<Self> {
        let state = Self::default();
        state.logged_in.store(true, Ordering::SeqCst);
        state.google_connected.store(true, Ordering::SeqCst);
        *state.cx_response.lock() = json!({ "total": 0 });
        Arc::new(state)
    }

    pub fn logged_out() -> Arc<Self> {
        let state = Self::logged_in();
        state.logged_in.store(false, Ordering::SeqCst);
        state
    }
}

pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    pub async fn spawn(state: Arc<BackendState>) -> Self {
        let app = Router::new()
            .route("/auth/status", get(auth_status))
            .route("/auth/logout", post(logout))
            .route("/integrations/google/status", get(google_status))
            .route("/analysis/file", post(analyze_file))
            .route("/analysis/cx-analysis", post(cx_analysis))
            .route("/dashboard/rating-trend", get(rating_trend))
            .route("/reviews/sync", post(sync_reviews))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn config(&self) -> Config {
        Config {
            overlay_delay: Duration::from_millis(5),
            preview_delay: Duration::from_millis(5),
            ..Config::default()
        }
        .with_api_url(format!("http://{}", self.addr))
    }

    pub fn page_context(&self, start: Route) -> (PageContext, Arc<History>) {
        let history = Arc::new(History::new(start));
        let ctx = PageContext::new(self.config(), history.clone()).unwrap();
        (ctx, history)
    }
}

async fn sleep_ms(ms: &AtomicU64) {
    let delay = ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

async fn auth_status(State(state): State<Arc<BackendState>>) -> Response {
    state.status_calls.fetch_add(1, Ordering::SeqCst);
    sleep_ms(&state.status_delay_ms).await;

    if state.status_fails.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if state.status_malformed.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>oops</html>").into_response();
    }
    Json(json!({ "logged_in": state.logged_in.load(Ordering::SeqCst) })).into_response()
}

async fn logout(State(state): State<Arc<BackendState>>) -> Json<Value> {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);
    state.logged_in.store(false, Ordering::SeqCst);
    Json(json!({ "logged_out": true }))
}

async fn google_status(State(state): State<Arc<BackendState>>) -> Response {
    if state.google_status_fails.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({ "connected": state.google_connected.load(Ordering::SeqCst) })).into_response()
}

pub fn analysis_body(file_name: &str, size: usize) -> Value {
    json!({
        "file": file_name,
        "bytes": size,
        "sentiment": { "positive": 66.7, "neutral": 0.0, "negative": 33.3 },
        "total": 3
    })
}

async fn analyze_file(State(state): State<Arc<BackendState>>, mut multipart: Multipart) -> Response {
    state.analysis_calls.fetch_add(1, Ordering::SeqCst);
    sleep_ms(&state.analysis_delay_ms).await;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap_or_default().to_vec();
        *state.uploaded.lock() = Some((name, data));
    }

    if state.fail_analysis.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "model unavailable").into_response();
    }

    let uploaded = state.uploaded.lock().clone();
    match uploaded {
        Some((name, data)) => Json(analysis_body(&name, data.len())).into_response(),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn cx_analysis(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.cx_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_cx_query.lock() = params;
    sleep_ms(&state.cx_delay_ms).await;
    Json(state.cx_response.lock().clone())
}

async fn rating_trend(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.trend_calls.fetch_add(1, Ordering::SeqCst);
    let monthly = params.get("unit").map(String::as_str) == Some("month");
    *state.last_trend_query.lock() = params;

    if monthly {
        Json(json!([
            { "date": "2025-01", "avg_rating": 4.1, "review_count": 30, "highlight": false },
            { "date": "2025-02", "avg_rating": 3.6, "review_count": 22, "highlight": true }
        ]))
    } else {
        Json(json!([
            { "date": "2025-02-01", "avg_rating": 4.0, "review_count": 3, "highlight": false },
            { "date": "2025-02-02", "avg_rating": 4.5, "review_count": 2, "highlight": true },
            { "date": "2025-02-03", "avg_rating": 4.4, "review_count": 4 }
        ]))
    }
}

async fn sync_reviews(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.sync_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_sync_query.lock() = params;

    if state.sync_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Google API quota exceeded").into_response();
    }
    Json(json!({
        "message": "Google reviews sync completed",
        "inserted": state.sync_inserted.load(Ordering::SeqCst)
    }))
    .into_response()
}

pub fn full_report() -> Value {
    json!({
        "executive_summary": { "summary": "Customers praise the coffee but wait too long." },
        "rating": 4.3,
        "kpi": {
            "sentiment": { "positive": 68.0, "neutral": 20.0, "negative": 12.0 },
            "nps": 9.1
        },
        "drivers_of_satisfaction": [
            { "label": "Coffee quality", "value": 72.0 },
            { "label": "Friendly staff", "value": 55.0 }
        ],
        "areas_for_improvement": [{ "label": "Wait time", "value": 41.0 }],
        "strategic_insights": [
            { "title": "Morning rush", "description": "Most complaints cluster 8-9am." }
        ],
        "risk_and_action_plan": {
            "churn_risk": "LOW",
            "actions": [{ "area": "Operations", "action": "Open a second till at 8am." }]
        },
        "total": 57
    })
}
