use axum::{extract::State, routing::get, Json, Router};
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use crate::{api::AppState, types::ApiResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub database: bool,
}

/// 稼働確認（認証不要）
pub async fn health_handler(State(app_state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database = app_state
        .db
        .execute_unprepared("SELECT 1")
        .await
        .map_err(|e| tracing::warn!(error = %e, "Health check database ping failed"))
        .is_ok();

    Json(ApiResponse::success(
        "Serviço em funcionamento",
        HealthResponse {
            status: if database { "ok" } else { "degradado" }.to_string(),
            environment: app_state.config.environment.clone(),
            database,
        },
    ))
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_state)
}
