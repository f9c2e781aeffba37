pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;

use crate::config::AppConfig;
use crate::services::item_service::ItemService;
use crate::services::menu_service::MenuService;
use crate::services::photo_pipeline::PhotoPipeline;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::menu::get_menu,
        api::handlers::menu::get_stats,
        api::handlers::upload::upload_photo,
        api::handlers::items::create_item,
        api::handlers::items::update_item,
        api::handlers::items::delete_item,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::menu::MenuResponse,
            api::handlers::menu::StatsResponse,
            api::handlers::upload::UploadResponse,
            api::handlers::upload::UploadedPhoto,
            api::handlers::items::CreateItemResponse,
            api::handlers::items::MessageResponse,
            api::handlers::items::DeleteItemResponse,
            services::menu_service::MenuCategory,
            services::menu_service::MenuItem,
            services::menu_service::CategoryStat,
            services::item_service::ItemPayload,
        )
    ),
    tags(
        (name = "menu", description = "Public menu"),
        (name = "admin", description = "Menu item management and photo upload"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub menu_service: Arc<MenuService>,
    pub item_service: Arc<ItemService>,
    pub photos: Arc<PhotoPipeline>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let photos = Arc::new(PhotoPipeline::new(&config));
        Self {
            menu_service: Arc::new(MenuService::new(db.clone())),
            item_service: Arc::new(ItemService::new(db.clone(), photos.clone())),
            photos,
            db,
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(api::handlers::health::health_check))
        .route("/api/menu", get(api::handlers::menu::get_menu))
        .route("/api/upload", post(api::handlers::upload::upload_photo))
        .route("/api/admin/items", post(api::handlers::items::create_item))
        .route(
            "/api/admin/items/:id",
            put(api::handlers::items::update_item).delete(api::handlers::items::delete_item),
        )
        .route("/api/admin/stats", get(api::handlers::menu::get_stats))
        .nest_service(&state.config.public_prefix, uploads)
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(
            // 1MB buffer for multipart overhead
            state.config.max_photo_size.saturating_add(1024 * 1024),
        ))
        .with_state(state)
}
