pub mod health;
pub mod items;
pub mod menu;
pub mod upload;
