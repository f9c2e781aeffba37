use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use cardapio_backend::config::AppConfig;
use cardapio_backend::entities::{categories, prelude::*};
use cardapio_backend::infrastructure::database;
use cardapio_backend::{AppState, create_app};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    for (id, name) in [(1, "Bebidas"), (2, "Sobremesas")] {
        Categories::insert(categories::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            slug: Set(name.to_lowercase()),
        })
        .exec(&db)
        .await
        .unwrap();
    }
    db
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn suco() -> Value {
    json!({
        "category_id": 1,
        "name": "Suco de laranja",
        "description": "Natural, 500ml",
        "price": 8.5,
        "badge": "Novo",
        "featured": true
    })
}

#[tokio::test]
async fn test_create_item() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let (status, body) = send(app, "POST", "/api/admin/items", Some(suco())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["id"].as_i64().unwrap() as i32;

    let item = Items::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(item.name, "Suco de laranja");
    assert_eq!(item.price, Decimal::new(85, 1));
    assert_eq!(item.badge.as_deref(), Some("Novo"));
    assert!(item.featured);
    assert_eq!(item.photo_path, None);
}

#[tokio::test]
async fn test_create_requires_mandatory_fields() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let (status, body) = send(
        app,
        "POST",
        "/api/admin/items",
        Some(json!({"category_id": 1, "name": "Sem preço"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("description"), "{message}");
    assert!(message.contains("price"), "{message}");
    assert_eq!(Items::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_rejects_unknown_category_and_bad_json() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let mut payload = suco();
    payload["category_id"] = json!(99);
    let (status, body) = send(app.clone(), "POST", "/api/admin/items", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/admin/items")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(Items::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_replaces_every_field() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let (_, body) = send(app.clone(), "POST", "/api/admin/items", Some(suco())).await;
    let id = body["id"].as_i64().unwrap() as i32;

    let replacement = json!({
        "category_id": 2,
        "name": "Pudim",
        "description": "De leite condensado",
        "price": 12.5
    });
    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/admin/items/{id}"),
        Some(replacement),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let item = Items::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(item.category_id, 2);
    assert_eq!(item.name, "Pudim");
    assert_eq!(item.price, Decimal::new(125, 1));
    // omitted optional fields are cleared, not kept
    assert_eq!(item.badge, None);
    assert!(!item.featured);
}

#[tokio::test]
async fn test_update_missing_item_is_not_found() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let (_, body) = send(app.clone(), "POST", "/api/admin/items", Some(suco())).await;
    let existing = body["id"].as_i64().unwrap() as i32;

    let (status, body) = send(app, "PUT", "/api/admin/items/4242", Some(suco())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(Items::find().count(&db).await.unwrap(), 1);
    let untouched = Items::find_by_id(existing).one(&db).await.unwrap().unwrap();
    assert_eq!(untouched.name, "Suco de laranja");
}

#[tokio::test]
async fn test_update_missing_item_with_unknown_category_is_not_found() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let mut payload = suco();
    payload["category_id"] = json!(99);
    let (status, body) = send(app, "PUT", "/api/admin/items/4242", Some(payload)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found");
    assert_eq!(Items::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_existing_item_with_unknown_category_is_rejected() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let (_, body) = send(app.clone(), "POST", "/api/admin/items", Some(suco())).await;
    let id = body["id"].as_i64().unwrap() as i32;

    let mut payload = suco();
    payload["category_id"] = json!(99);
    let (status, _) = send(app, "PUT", &format!("/api/admin/items/{id}"), Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let item = Items::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(item.category_id, 1);
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db, AppConfig::development(dir.path())));

    let (status, body) = send(app, "DELETE", "/api/admin/items/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_delete_removes_row_and_photo() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let photo = dir.path().join("photo-1-1.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    let mut payload = suco();
    payload["photo_path"] = json!("/uploads/photo-1-1.jpg");
    payload["photo_original_name"] = json!("suco.jpg");
    let (_, body) = send(app.clone(), "POST", "/api/admin/items", Some(payload)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(app, "DELETE", &format!("/api/admin/items/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["photo_removed"], true);
    assert!(!photo.exists());
    assert_eq!(Items::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_succeeds_when_photo_file_is_gone() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db.clone(), AppConfig::development(dir.path())));

    let mut payload = suco();
    payload["photo_path"] = json!("/uploads/photo-deleted-out-of-band.jpg");
    let (_, body) = send(app.clone(), "POST", "/api/admin/items", Some(payload)).await;
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(app, "DELETE", &format!("/api/admin/items/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["photo_removed"], false);
    assert_eq!(Items::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_missing_item_is_not_found() {
    let db = setup_test_db().await;
    let dir = TempDir::new().unwrap();
    let app = create_app(AppState::new(db, AppConfig::development(dir.path())));

    let (status, body) = send(app, "DELETE", "/api/admin/items/7", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found");
}
