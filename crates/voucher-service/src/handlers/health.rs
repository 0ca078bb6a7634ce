//! 健康检查处理器

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::dto::{HealthResponse, ReadinessResponse};
use crate::state::AppState;

/// 存活探针
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// 就绪探针，检查数据库连通性
///
/// GET /ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let mut checks = BTreeMap::new();

    let database_ok = match state.voucher_service.ping().await {
        Ok(()) => {
            checks.insert("database".to_string(), "ok".to_string());
            true
        }
        Err(e) => {
            warn!(error = %e, "readiness check: database unavailable");
            checks.insert("database".to_string(), "error".to_string());
            false
        }
    };

    let (status, label) = if database_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ReadinessResponse {
            status: label.to_string(),
            checks,
        }),
    )
}
