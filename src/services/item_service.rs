use crate::api::error::AppError;
use crate::entities::{items, prelude::*};
use crate::services::photo_pipeline::PhotoPipeline;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Body of create and update. Update is a full replace: every field is resupplied,
/// and an omitted optional field is written as null (or `false` for `featured`).
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct ItemPayload {
    #[validate(required)]
    pub category_id: Option<i32>,
    #[validate(required, length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(required, length(min = 1))]
    pub description: Option<String>,
    #[validate(required)]
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub badge: Option<String>,
    #[serde(default)]
    pub featured: bool,
    pub photo_path: Option<String>,
    pub photo_original_name: Option<String>,
}

/// A payload that passed validation
#[derive(Debug, Clone, PartialEq)]
struct ItemFields {
    category_id: i32,
    name: String,
    description: String,
    price: Decimal,
    badge: Option<String>,
    featured: bool,
    photo_path: Option<String>,
    photo_original_name: Option<String>,
}

impl TryFrom<ItemPayload> for ItemFields {
    type Error = AppError;

    fn try_from(payload: ItemPayload) -> Result<Self, Self::Error> {
        if let Err(e) = payload.validate() {
            let errors = e.field_errors();
            let mut fields: Vec<&str> = errors.keys().map(|k| k.as_ref()).collect();
            fields.sort_unstable();
            return Err(AppError::Validation(format!(
                "Required fields: category_id, name, description, price (missing or invalid: {})",
                fields.join(", ")
            )));
        }

        let (Some(category_id), Some(name), Some(description), Some(price)) = (
            payload.category_id,
            payload.name,
            payload.description,
            payload.price,
        ) else {
            return Err(AppError::Validation(
                "Required fields: category_id, name, description, price".to_string(),
            ));
        };

        if price.is_sign_negative() {
            return Err(AppError::Validation("price must not be negative".to_string()));
        }

        Ok(Self {
            category_id,
            name,
            description,
            price,
            badge: payload.badge.filter(|b| !b.is_empty()),
            featured: payload.featured,
            photo_path: payload.photo_path.filter(|p| !p.is_empty()),
            photo_original_name: payload.photo_original_name.filter(|n| !n.is_empty()),
        })
    }
}

impl ItemFields {
    fn into_active_model(self) -> items::ActiveModel {
        items::ActiveModel {
            category_id: Set(self.category_id),
            name: Set(self.name),
            description: Set(self.description),
            price: Set(self.price),
            badge: Set(self.badge),
            featured: Set(self.featured),
            photo_path: Set(self.photo_path),
            photo_original_name: Set(self.photo_original_name),
            ..Default::default()
        }
    }
}

/// What happened to the photo file of a deleted item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoCleanup {
    NoPhoto,
    Removed,
    /// The row is gone but the file could not be removed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub id: i32,
    pub photo: PhotoCleanup,
}

pub struct ItemService {
    db: DatabaseConnection,
    photos: Arc<PhotoPipeline>,
}

impl ItemService {
    pub fn new(db: DatabaseConnection, photos: Arc<PhotoPipeline>) -> Self {
        Self { db, photos }
    }

    pub async fn create(&self, payload: ItemPayload) -> Result<i32, AppError> {
        let fields = ItemFields::try_from(payload)?;
        self.ensure_category(fields.category_id).await?;

        let res = Items::insert(fields.into_active_model())
            .exec(&self.db)
            .await?;

        info!("🍽️  Item {} created", res.last_insert_id);
        Ok(res.last_insert_id)
    }

    pub async fn update(&self, id: i32, payload: ItemPayload) -> Result<(), AppError> {
        let fields = ItemFields::try_from(payload)?;

        // an absent row is NotFound regardless of what the payload references
        if Items::find_by_id(id).one(&self.db).await?.is_none() {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        self.ensure_category(fields.category_id).await?;

        // rows_affected is not trusted here: MySQL reports 0 for an unchanged row
        Items::update_many()
            .set(fields.into_active_model())
            .filter(items::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        info!("🍽️  Item {} updated", id);
        Ok(())
    }

    /// Removes the row, then the photo file. A failed file removal is logged and
    /// reported in the outcome; the delete itself still succeeds.
    pub async fn delete(&self, id: i32) -> Result<DeleteOutcome, AppError> {
        let item = Items::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

        let res = Items::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }

        let photo = match item.photo_path.as_deref() {
            None | Some("") => PhotoCleanup::NoPhoto,
            Some(public_path) => match self.photos.remove(public_path).await {
                Ok(()) => PhotoCleanup::Removed,
                Err(e) => {
                    warn!(
                        "⚠️ Item {} deleted but photo {} was not removed: {}",
                        id, public_path, e
                    );
                    PhotoCleanup::Failed(e.to_string())
                }
            },
        };

        info!("🗑️  Item {} deleted", id);
        Ok(DeleteOutcome { id, photo })
    }

    async fn ensure_category(&self, category_id: i32) -> Result<(), AppError> {
        let exists = Categories::find_by_id(category_id)
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(AppError::Validation(format!(
                "Unknown category_id {}",
                category_id
            )));
        }
        Ok(())
    }
}
