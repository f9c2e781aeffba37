use crate::api::error::AppError;
use crate::entities::{categories, items, prelude::*};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryOrder, QuerySelect,
    RelationTrait,
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MenuItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub badge: Option<String>,
    pub featured: bool,
    pub photo_path: Option<String>,
    pub photo_original_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MenuCategory {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult, ToSchema)]
pub struct CategoryStat {
    pub category: String,
    pub total: i64,
}

/// One row of the categories ⟕ items join. Item columns are null for an empty category.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct MenuRow {
    pub category_id: i32,
    pub category_name: String,
    pub slug: String,
    pub item_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub badge: Option<String>,
    pub featured: Option<bool>,
    pub photo_path: Option<String>,
    pub photo_original_name: Option<String>,
}

impl MenuRow {
    fn into_item(self) -> Option<MenuItem> {
        let id = self.item_id?;
        Some(MenuItem {
            id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            badge: self.badge,
            featured: self.featured.unwrap_or(false),
            photo_path: self.photo_path,
            photo_original_name: self.photo_original_name,
        })
    }
}

/// Folds the flat join rows into categories, keeping first-seen category order
/// and row order within each category.
pub fn group_rows(rows: impl IntoIterator<Item = MenuRow>) -> Vec<MenuCategory> {
    let mut categories: IndexMap<i32, MenuCategory> = IndexMap::new();

    for row in rows {
        let category = categories
            .entry(row.category_id)
            .or_insert_with(|| MenuCategory {
                id: row.category_id,
                name: row.category_name.clone(),
                slug: row.slug.clone(),
                items: Vec::new(),
            });

        if let Some(item) = row.into_item() {
            category.items.push(item);
        }
    }

    categories.into_values().collect()
}

pub struct MenuService {
    db: DatabaseConnection,
}

impl MenuService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every category with its items: categories by id, featured items first, then newest.
    pub async fn get_menu(&self) -> Result<Vec<MenuCategory>, AppError> {
        let rows = Categories::find()
            .select_only()
            .column_as(categories::Column::Id, "category_id")
            .column_as(categories::Column::Name, "category_name")
            .column_as(categories::Column::Slug, "slug")
            .column_as(items::Column::Id, "item_id")
            .column_as(items::Column::Name, "name")
            .column_as(items::Column::Description, "description")
            .column_as(items::Column::Price, "price")
            .column_as(items::Column::Badge, "badge")
            .column_as(items::Column::Featured, "featured")
            .column_as(items::Column::PhotoPath, "photo_path")
            .column_as(items::Column::PhotoOriginalName, "photo_original_name")
            .join(JoinType::LeftJoin, categories::Relation::Items.def())
            .order_by_asc(categories::Column::Id)
            .order_by_desc(items::Column::Featured)
            .order_by_desc(items::Column::Id)
            .into_model::<MenuRow>()
            .all(&self.db)
            .await?;

        debug!("📋 Menu query returned {} rows", rows.len());

        Ok(group_rows(rows))
    }

    /// Item count per category, empty categories included
    pub async fn category_stats(&self) -> Result<Vec<CategoryStat>, AppError> {
        let stats = Categories::find()
            .select_only()
            .column_as(categories::Column::Name, "category")
            .column_as(Expr::col((items::Entity, items::Column::Id)).count(), "total")
            .join(JoinType::LeftJoin, categories::Relation::Items.def())
            .group_by(categories::Column::Id)
            .group_by(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .into_model::<CategoryStat>()
            .all(&self.db)
            .await?;

        Ok(stats)
    }
}
