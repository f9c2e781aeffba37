use crate::AppState;
use crate::api::error::AppError;
use crate::services::item_service::{ItemPayload, PhotoCleanup};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct CreateItemResponse {
    pub success: bool,
    pub message: String,
    pub id: i32,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteItemResponse {
    pub success: bool,
    pub message: String,
    /// False when the item had a photo that could not be removed from disk
    pub photo_removed: bool,
}

fn item_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::Validation("Item id must be an integer".to_string()))
}

fn payload(body: Result<Json<ItemPayload>, JsonRejection>) -> Result<ItemPayload, AppError> {
    body.map(|Json(p)| p)
        .map_err(|e| AppError::Validation(e.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/admin/items",
    request_body = ItemPayload,
    responses(
        (status = 201, description = "Item created", body = CreateItemResponse),
        (status = 400, description = "Missing or invalid fields")
    ),
    tag = "admin"
)]
pub async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateItemResponse>), AppError> {
    let id = state.item_service.create(payload(body)?).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            success: true,
            message: "Item created".to_string(),
            id,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/items/{id}",
    request_body = ItemPayload,
    params(
        ("id" = i32, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item replaced", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Item not found")
    ),
    tag = "admin"
)]
pub async fn update_item(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<ItemPayload>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = item_id(path)?;
    state.item_service.update(id, payload(body)?).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Item updated".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/admin/items/{id}",
    params(
        ("id" = i32, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item deleted", body = DeleteItemResponse),
        (status = 404, description = "Item not found")
    ),
    tag = "admin"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeleteItemResponse>, AppError> {
    let id = item_id(path)?;
    let outcome = state.item_service.delete(id).await?;

    let (message, photo_removed) = match outcome.photo {
        PhotoCleanup::NoPhoto | PhotoCleanup::Removed => ("Item deleted", true),
        PhotoCleanup::Failed(_) => ("Item deleted; its photo file could not be removed", false),
    };

    Ok(Json(DeleteItemResponse {
        success: true,
        message: message.to_string(),
        photo_removed,
    }))
}
