use crate::AppState;
use crate::api::error::AppError;
use crate::services::photo_pipeline::{IncomingPhoto, PhotoPipeline};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use bytes::BytesMut;
use serde::Serialize;
use utoipa::ToSchema;

/// Multipart field carrying the photo
pub const PHOTO_FIELD: &str = "photo";

#[derive(Serialize, ToSchema)]
pub struct UploadedPhoto {
    /// Relative URL to store in an item's `photo_path`
    pub photo_path: String,
    pub photo_original_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadedPhoto,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = Object, description = "Image file in the `photo` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Photo stored and resized", body = UploadResponse),
        (status = 400, description = "No photo, not an image, or too large"),
        (status = 500, description = "Photo could not be processed")
    ),
    tag = "admin"
)]
pub async fn upload_photo(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;

    let photo = read_photo_field(&mut multipart, &state.photos).await?;
    let ingested = state.photos.ingest(photo).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Photo uploaded".to_string(),
        data: UploadedPhoto {
            photo_path: ingested.public_path,
            photo_original_name: ingested.original_name,
        },
    }))
}

/// Buffers the `photo` field, giving up as soon as it outgrows the size ceiling
async fn read_photo_field(
    multipart: &mut Multipart,
    photos: &PhotoPipeline,
) -> Result<IncomingPhoto, AppError> {
    let max_size = photos.limits().max_size;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or(PHOTO_FIELD).to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut data = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let size = data.len() + chunk.len();
            if size > max_size {
                photos.validate(&content_type, size)?;
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(IncomingPhoto {
            original_name,
            content_type,
            data: data.freeze(),
        });
    }

    Err(AppError::Validation("No photo uploaded".to_string()))
}
