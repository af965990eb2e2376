//! Storefront themes: the public active theme and superadmin management.

mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::{json, Value};

fn palette(name: &str) -> Value {
    json!({
        "name": name,
        "primary_color": "#8e2c48",
        "secondary_color": "#f4d6cc",
        "accent_color": "#d4a017",
        "text_color": "#222",
        "bg_color": "#ffffff",
        "success_color": "#2e7d32",
        "error_color": "#c62828"
    })
}

#[tokio::test]
async fn stock_themes_are_seeded_with_one_default() {
    let app = TestApp::new().await;

    let (status, themes) = app.superadmin(Method::GET, "/api/v1/admin/themes", None).await;
    assert_eq!(status, StatusCode::OK);
    let themes = themes["data"].as_array().unwrap();
    assert_eq!(themes.len(), 5);
    assert_eq!(themes.iter().filter(|t| t["is_default"] == true).count(), 1);

    let (status, active) = app.public(Method::GET, "/api/v1/theme", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["data"]["is_default"], true);
}

#[tokio::test]
async fn activating_a_theme_moves_the_default() {
    let app = TestApp::new().await;
    let (status, created) = app
        .superadmin(Method::POST, "/api/v1/admin/themes", Some(palette("Carnaval")))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["is_default"], false);

    let (status, activated) = app
        .superadmin(
            Method::POST,
            &format!("/api/v1/admin/themes/{}/activate", id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activated["data"]["is_default"], true);

    let (_, active) = app.public(Method::GET, "/api/v1/theme", None).await;
    assert_eq!(active["data"]["name"], "Carnaval");

    let (_, themes) = app.superadmin(Method::GET, "/api/v1/admin/themes", None).await;
    let defaults: Vec<_> = themes["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["is_default"] == true)
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(defaults, [id]);

    // The active theme is protected.
    let (status, _) = app
        .superadmin(Method::DELETE, &format!("/api/v1/admin/themes/{}", id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn invalid_colours_and_duplicate_names_are_rejected() {
    let app = TestApp::new().await;
    let mut bad = palette("Roto");
    bad["primary_color"] = json!("rojo");
    let (status, _) = app
        .superadmin(Method::POST, "/api/v1/admin/themes", Some(bad))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .superadmin(Method::POST, "/api/v1/admin/themes", Some(palette("Doble")))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .superadmin(Method::POST, "/api/v1/admin/themes", Some(palette("Doble")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn regular_admins_cannot_manage_themes() {
    let app = TestApp::new().await;
    let (status, body) = app
        .admin(Method::POST, "/api/v1/admin/themes", Some(palette("Intruso")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "AUTH_INSUFFICIENT_PERMISSIONS");

    let (status, _) = app.admin(Method::GET, "/api/v1/admin/themes", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
