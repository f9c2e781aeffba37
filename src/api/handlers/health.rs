use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub database: String,
    /// Public prefix photos are served under
    pub uploads: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = if state.db.ping().await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    let upload_root_ready = tokio::fs::metadata(state.photos.upload_root())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    Json(HealthResponse {
        success: true,
        message: if upload_root_ready {
            "API is running".to_string()
        } else {
            "API is running; upload directory is missing".to_string()
        },
        database: db_status.to_string(),
        uploads: format!("{}/", state.config.public_prefix),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
