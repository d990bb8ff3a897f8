use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::app::QuizApp;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub games: GameHealth,
    pub reference: ReferenceHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameHealth {
    pub coop_sessions: usize,
    pub solo_sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReferenceHealth {
    pub status: String,
    pub countries: usize,
    pub continents: usize,
    pub cached_facts: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub app: Arc<QuizApp>,
    pub start_time: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(app: Arc<QuizApp>) -> Self {
        let state = AppState {
            app,
            start_time: Utc::now(),
        };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    let status = state.app.status();
    let reference_ok = status.countries > 0;
    let uptime = Utc::now()
        .signed_duration_since(state.start_time)
        .num_seconds()
        .max(0) as u64;

    let health_response = HealthResponse {
        status: if reference_ok { "healthy" } else { "unhealthy" }.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        games: GameHealth {
            coop_sessions: status.coop_sessions,
            solo_sessions: status.solo_sessions,
        },
        reference: ReferenceHealth {
            status: if reference_ok { "loaded" } else { "empty" }.to_string(),
            countries: status.countries,
            continents: status.continents,
            cached_facts: status.cached_facts,
        },
        uptime_seconds: uptime,
    };

    if reference_ok {
        Ok(Json(health_response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<AppState>) -> Result<Json<&'static str>, StatusCode> {
    if state.app.status().countries > 0 {
        Ok(Json("ready"))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
