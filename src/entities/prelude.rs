pub use super::categories::Entity as Categories;
pub use super::items::Entity as Items;
