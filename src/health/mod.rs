/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - process is up
 * - Readiness check (`/health/ready`) - database answers and the upload directory exists
 * - Liveness check (`/health/live`) - uptime
 * - Version (`/health/version`)
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::AppState;

static STARTED: OnceLock<Instant> = OnceLock::new();

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
    Degraded,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub details: BTreeMap<String, HealthDetail>,
}

impl ReadinessReport {
    /// Database down is fatal; a missing upload directory only degrades image
    /// serving.
    fn overall(details: &BTreeMap<String, HealthDetail>) -> HealthStatus {
        if details.values().any(|d| d.status == HealthStatus::Down) {
            HealthStatus::Down
        } else if details.values().any(|d| d.status == HealthStatus::Degraded) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Up
        }
    }
}

/// Marks process start; called once from `main`.
pub fn mark_started() {
    STARTED.get_or_init(Instant::now);
}

fn uptime_seconds() -> u64 {
    STARTED.get_or_init(Instant::now).elapsed().as_secs()
}

pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check() -> impl IntoResponse {
    debug!("Health check endpoint called");
    (
        StatusCode::OK,
        Json(json!({
            "status": HealthStatus::Up,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "alive": true,
        "uptime_seconds": uptime_seconds(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let mut details = BTreeMap::new();

    let database = match state.db.ping().await {
        Ok(()) => HealthDetail {
            status: HealthStatus::Up,
            message: None,
        },
        Err(e) => {
            error!("Database health check failed: {}", e);
            HealthDetail {
                status: HealthStatus::Down,
                message: Some(e.to_string()),
            }
        }
    };
    details.insert("database".to_string(), database);

    let uploads = if Path::new(&state.config.upload_dir).is_dir() {
        HealthDetail {
            status: HealthStatus::Up,
            message: None,
        }
    } else {
        warn!(dir = %state.config.upload_dir, "Upload directory missing");
        HealthDetail {
            status: HealthStatus::Degraded,
            message: Some(format!("{} does not exist", state.config.upload_dir)),
        }
    };
    details.insert("uploads".to_string(), uploads);

    let status = ReadinessReport::overall(&details);
    let code = match status {
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Up | HealthStatus::Degraded => StatusCode::OK,
    };

    (
        code,
        Json(ReadinessReport {
            status,
            timestamp: Utc::now(),
            details,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
}
