//! Authentication and role checks across the route groups.

mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, ADMIN_PASSWORD};
use serde_json::json;

#[tokio::test]
async fn admin_routes_need_a_token() {
    let app = TestApp::new().await;
    for uri in [
        "/api/v1/admin/dashboard",
        "/api/v1/admin/orders",
        "/api/v1/admin/custom-orders",
        "/api/v1/admin/users",
    ] {
        let (status, body) = app.public(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"]["code"], "AUTH_MISSING", "{uri}");
    }

    let (status, body) = app
        .call(Method::GET, "/api/v1/admin/orders", None, Some("not-a-jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_INVALID_TOKEN");
}

#[tokio::test]
async fn public_routes_are_open() {
    let app = TestApp::new().await;
    for uri in [
        "/api/v1/catalog/products",
        "/api/v1/catalog/home",
        "/api/v1/theme",
        "/api/v1/contact",
        "/api/v1/settings",
        "/health",
        "/health/live",
    ] {
        let (status, _) = app.public(Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn user_management_is_superadmin_only() {
    let app = TestApp::new().await;

    let (status, _) = app.admin(Method::GET, "/api/v1/admin/users", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, users) = app.superadmin(Method::GET, "/api/v1/admin/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let usernames: Vec<_> = users["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(usernames, ["owner", "staff"]);
    assert!(users["data"][0].get("password").is_none());
    assert!(users["data"][0].get("password_hash").is_none());
}

#[tokio::test]
async fn superadmins_manage_accounts_but_not_their_own_role() {
    let app = TestApp::new().await;

    let (status, created) = app
        .superadmin(
            Method::POST,
            "/api/v1/admin/users",
            Some(json!({ "username": "costurera", "password": "hilo-y-aguja", "name": "Eva" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["is_superadmin"], false);

    let (status, _) = app
        .superadmin(
            Method::POST,
            "/api/v1/admin/users",
            Some(json!({ "username": "costurera", "password": "otra-clave" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .superadmin(
            Method::PUT,
            &format!("/api/v1/admin/users/{}", app.superadmin_id),
            Some(json!({ "is_superadmin": false })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .superadmin(
            Method::DELETE,
            &format!("/api/v1/admin/users/{}", app.superadmin_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .superadmin(
            Method::DELETE,
            &format!("/api/v1/admin/users/{}", app.admin_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_issues_a_working_token_and_logout_revokes_it() {
    let app = TestApp::new().await;

    let (status, _) = app
        .public(
            Method::POST,
            "/auth/login",
            Some(json!({ "username": "staff", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = app
        .public(
            Method::POST,
            "/auth/login",
            Some(json!({ "username": "staff", "password": ADMIN_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["access_token"].as_str().unwrap().to_string();
    assert_eq!(login["token_type"], "Bearer");

    let (status, profile) = app
        .call(Method::GET, "/api/v1/admin/profile", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["data"]["username"], "staff");
    assert!(profile["data"]["last_login"].is_string());

    let (status, _) = app
        .call(Method::POST, "/auth/logout", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(Method::GET, "/api/v1/admin/profile", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_REVOKED_TOKEN");
}

#[tokio::test]
async fn profile_updates_apply_to_the_signed_in_user() {
    let app = TestApp::new().await;
    let (status, updated) = app
        .admin(
            Method::PUT,
            "/api/v1/admin/profile",
            Some(json!({ "name": "Paty", "password": "nueva-clave-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["name"], "Paty");

    let (status, _) = app
        .public(
            Method::POST,
            "/auth/login",
            Some(json!({ "username": "staff", "password": "nueva-clave-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
