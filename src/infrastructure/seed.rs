use crate::entities::{categories, prelude::*};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use tracing::info;

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Entradas", "entradas"),
    ("Pratos Principais", "pratos-principais"),
    ("Bebidas", "bebidas"),
    ("Sobremesas", "sobremesas"),
];

/// Inserts the default menu categories, only when the table is empty
pub async fn seed_categories(db: &DatabaseConnection) -> anyhow::Result<()> {
    let existing = Categories::find().count(db).await?;
    if existing > 0 {
        return Ok(());
    }

    info!("🌱 Seeding {} default categories...", DEFAULT_CATEGORIES.len());

    let models = DEFAULT_CATEGORIES.iter().map(|(name, slug)| categories::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        ..Default::default()
    });
    Categories::insert_many(models).exec(db).await?;

    Ok(())
}
