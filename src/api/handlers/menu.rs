use crate::AppState;
use crate::api::error::AppError;
use crate::services::menu_service::{CategoryStat, MenuCategory};
use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct MenuResponse {
    pub success: bool,
    pub data: Vec<MenuCategory>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub data: Vec<CategoryStat>,
}

#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "Categories with their items, featured first", body = MenuResponse),
        (status = 500, description = "Database unavailable")
    ),
    tag = "menu"
)]
pub async fn get_menu(State(state): State<AppState>) -> Result<Json<MenuResponse>, AppError> {
    let data = state.menu_service.get_menu().await?;
    Ok(Json(MenuResponse {
        success: true,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Number of items per category", body = StatsResponse),
        (status = 500, description = "Database unavailable")
    ),
    tag = "admin"
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let data = state.menu_service.category_stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}
