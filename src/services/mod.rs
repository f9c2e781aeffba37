pub mod item_service;
pub mod menu_service;
pub mod photo_pipeline;
