//! Storefront catalog: visibility, sorting, product views, images, and the
//! maintenance switch.

mod common;

use axum::{
    body,
    http::{Method, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};

fn names(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn inactive_products_and_categories_are_hidden() {
    let app = TestApp::new().await;
    let polleras = app.create_category("Polleras").await;
    app.create_product("Pollera visible", "300", Some(polleras)).await;
    let hidden = app.create_product("Pollera oculta", "300", Some(polleras)).await;

    let (status, _) = app
        .admin(
            Method::PUT,
            &format!("/api/v1/admin/products/{}", hidden),
            Some(json!({ "name": "Pollera oculta", "price": "300", "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, archived) = app
        .admin(
            Method::POST,
            "/api/v1/admin/categories",
            Some(json!({ "name": "Archivo", "is_active": false })),
        )
        .await;
    assert_eq!(archived["data"]["is_active"], false);

    let (status, list) = app.public(Method::GET, "/api/v1/catalog/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&list), ["Pollera visible"]);

    let (status, _) = app
        .public(Method::GET, &format!("/api/v1/catalog/products/{}", hidden), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, categories) = app.public(Method::GET, "/api/v1/catalog/categories", None).await;
    let category_names: Vec<_> = categories["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(category_names, ["Polleras"]);

    // The back office still sees everything.
    let (_, admin_list) = app.admin(Method::GET, "/api/v1/admin/products", None).await;
    assert_eq!(admin_list["data"]["total"], 2);
}

#[tokio::test]
async fn sorting_and_filters() {
    let app = TestApp::new().await;
    let blusas = app.create_category("Blusas").await;
    app.create_product("Blusa bordada", "150", Some(blusas)).await;
    app.create_product("Aguayo", "90", None).await;
    app.create_product("Chaqueta", "400", None).await;

    let (_, by_price) = app
        .public(Method::GET, "/api/v1/catalog/products?sort=precio_asc", None)
        .await;
    assert_eq!(names(&by_price), ["Aguayo", "Blusa bordada", "Chaqueta"]);

    let (_, by_name) = app
        .public(Method::GET, "/api/v1/catalog/products?sort=nombre_desc", None)
        .await;
    assert_eq!(names(&by_name), ["Chaqueta", "Blusa bordada", "Aguayo"]);

    // Unknown sorts fall back to newest first.
    let (status, fallback) = app
        .public(Method::GET, "/api/v1/catalog/products?sort=aleatorio", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&fallback), ["Chaqueta", "Aguayo", "Blusa bordada"]);

    let (_, in_category) = app
        .public(
            Method::GET,
            &format!("/api/v1/catalog/products?category_id={}", blusas),
            None,
        )
        .await;
    assert_eq!(names(&in_category), ["Blusa bordada"]);

    let (_, searched) = app
        .public(Method::GET, "/api/v1/catalog/products?q=Chaq", None)
        .await;
    assert_eq!(names(&searched), ["Chaqueta"]);

    let (_, paged) = app
        .public(Method::GET, "/api/v1/catalog/products?per_page=2&page=2", None)
        .await;
    assert_eq!(paged["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged["data"]["total"], 3);
}

#[tokio::test]
async fn viewing_a_product_counts_and_lists_related() {
    let app = TestApp::new().await;
    let mantas = app.create_category("Mantas").await;
    let main = app.create_product("Manta de vicuña", "900", Some(mantas)).await;
    app.create_product("Manta de alpaca", "600", Some(mantas)).await;
    app.create_product("Pollera", "300", None).await;

    let uri = format!("/api/v1/catalog/products/{}", main);
    app.public(Method::GET, &uri, None).await;
    let (status, detail) = app.public(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["product"]["views"], 2);
    let related: Vec<_> = detail["data"]["related"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(related, ["Manta de alpaca"]);

    let (_, popular) = app
        .public(Method::GET, "/api/v1/catalog/products?sort=populares", None)
        .await;
    assert_eq!(names(&popular)[0], "Manta de vicuña");
}

#[tokio::test]
async fn home_sections_follow_product_flags() {
    let app = TestApp::new().await;
    let (status, _) = app
        .admin(
            Method::POST,
            "/api/v1/admin/products",
            Some(json!({ "name": "Blusa nueva", "price": "120", "is_new": true, "is_featured": true })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.create_product("Blusa simple", "80", None).await;

    let (status, home) = app.public(Method::GET, "/api/v1/catalog/home", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(home["data"]["new_arrivals"].as_array().unwrap().len(), 1);
    assert_eq!(home["data"]["featured"][0]["name"], "Blusa nueva");
    assert!(home["data"]["trending"].as_array().unwrap().is_empty());
    assert_eq!(home["data"]["latest"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn uploaded_images_are_served_and_become_main() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Pollera rosada", "320", None).await;

    let (status, body) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/products/{}/images", product_id),
            Some(json!({ "filename": "foto.png", "data": "data:image/png;base64,aGVsbG8=" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let url = body["data"]["main_image"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    let response = app.request(Method::GET, &url, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"hello");

    let (status, _) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/products/{}/images", product_id),
            Some(json!({ "filename": "script.exe", "data": "aGVsbG8=" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn maintenance_mode_closes_the_storefront_only() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Vestido", "500", None).await;

    let (status, _) = app
        .admin(
            Method::PUT,
            "/api/v1/admin/settings",
            Some(json!({ "maintenance_mode": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.public(Method::GET, "/api/v1/catalog/products", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Service Unavailable");

    let (status, _) = app
        .public(
            Method::POST,
            "/api/v1/checkout/qr",
            Some(json!({ "product_id": product_id })),
        )
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, settings) = app.public(Method::GET, "/api/v1/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["data"]["maintenance_mode"], true);

    let (status, _) = app.admin(Method::GET, "/api/v1/admin/products", None).await;
    assert_eq!(status, StatusCode::OK);

    app.admin(
        Method::PUT,
        "/api/v1/admin/settings",
        Some(json!({ "maintenance_mode": false })),
    )
    .await;
    let (status, _) = app.public(Method::GET, "/api/v1/catalog/products", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn categories_with_products_cannot_be_deleted() {
    let app = TestApp::new().await;
    let category = app.create_category("Chaquetas").await;
    app.create_product("Chaqueta bordada", "420", Some(category)).await;

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{}", category),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let empty = app.create_category("Temporada").await;
    let (status, _) = app
        .admin(Method::DELETE, &format!("/api/v1/admin/categories/{}", empty), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}
