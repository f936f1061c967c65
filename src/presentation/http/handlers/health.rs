//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the process serving requests?)
//! - `GET /health/ready` - Readiness probe (is storage reachable?), with the
//!   live counters of the delivery core

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::startup::AppState;

/// Storage round-trips slower than this report `degraded`
const STORAGE_LATENCY_BUDGET_MS: u64 = 100;

static SERVER_START: Lazy<(Instant, DateTime<Utc>)> = Lazy::new(|| (Instant::now(), Utc::now()));

/// Pin the uptime origin (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Storage probe result
#[derive(Debug, Serialize)]
pub struct StorageCheck {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StorageCheck {
    fn from_latency(latency_ms: u64) -> Self {
        Self {
            status: if latency_ms < STORAGE_LATENCY_BUDGET_MS {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            latency_ms: Some(latency_ms),
            message: None,
        }
    }

    fn unreachable() -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some("Database connection failed".to_string()),
        }
    }
}

/// Live counters of the delivery core
#[derive(Debug, Serialize)]
pub struct RealtimeCounters {
    pub active_connections: usize,
    pub active_rooms: usize,
    pub bridge_topics: usize,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: StorageCheck,
    pub realtime: RealtimeCounters,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: ReadinessChecks,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Returns 503 when storage is unreachable. Realtime counters never fail the
/// probe; the delivery core runs in-process.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = probe_storage(&state).await;
    let status = database.status;

    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: SERVER_START.0.elapsed().as_secs(),
        started_at: SERVER_START.1.to_rfc3339(),
        checks: ReadinessChecks {
            database,
            realtime: RealtimeCounters {
                active_connections: state.registry.connection_count(),
                active_rooms: state.registry.room_count(),
                bridge_topics: state.bridge.topic_count(),
            },
        },
    };

    (status.status_code(), Json(response))
}

async fn probe_storage(state: &AppState) -> StorageCheck {
    let start = Instant::now();
    match state.chat_repository.ping().await {
        Ok(()) => StorageCheck::from_latency(start.elapsed().as_millis() as u64),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness storage probe failed");
            StorageCheck::unreachable()
        }
    }
}
