//! Retail orders end to end: checkout, public tracking, status changes with
//! history, filtering, and deletion.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn qr_checkout_starts_received_with_one_history_entry() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Pollera de gala", "350.00", None).await;

    let (status, body) = app
        .public(
            Method::POST,
            "/api/v1/checkout/qr",
            Some(json!({ "product_id": product_id, "order_notes": "Talla M" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let code = body["data"]["order_code"].as_str().unwrap().to_string();
    assert!(code.starts_with("MP-"));
    assert_eq!(
        body["data"]["redirect_url"],
        format!("https://tienda.test/api/v1/orders/track/{}", code)
    );

    let (status, tracking) = app
        .public(Method::GET, &format!("/api/v1/orders/track/{}", code), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracking["data"]["status"], "Recibido");
    assert_eq!(decimal(&tracking["data"]["total"]), dec!(350));
    assert_eq!(tracking["data"]["product"]["name"], "Pollera de gala");
    let history = tracking["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "Recibido");
    assert_eq!(history[0]["actor"], "Tienda online");
}

#[tokio::test]
async fn tracking_is_case_insensitive_and_unknown_codes_are_404() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Blusa bordada", "120", None).await;
    let code = app.place_qr_order(product_id).await;

    let (status, _) = app
        .public(
            Method::GET,
            &format!("/api/v1/orders/track/{}", code.to_lowercase()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .public(Method::GET, "/api/v1/orders/track/MP-1999-000000", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn status_changes_append_history_in_order() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Manta", "90", None).await;
    let code = app.place_qr_order(product_id).await;

    let (_, list) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/orders?search={}", code),
            None,
        )
        .await;
    let order_id = list["data"]["items"][0]["id"].as_i64().unwrap();

    for (status, note) in [("Confeccionando", None), ("En camino", Some("Courier 123"))] {
        let (code, body) = app
            .admin(
                Method::POST,
                &format!("/api/v1/admin/orders/{}/status", order_id),
                Some(json!({ "status": status, "note": note })),
            )
            .await;
        assert_eq!(code, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["status"], status);
    }

    let (_, detail) = app
        .admin(Method::GET, &format!("/api/v1/admin/orders/{}", order_id), None)
        .await;
    let history = detail["data"]["history"].as_array().unwrap();
    let statuses: Vec<_> = history.iter().map(|h| h["status"].as_str().unwrap()).collect();
    assert_eq!(statuses, ["Recibido", "Confeccionando", "En camino"]);
    assert_eq!(history[2]["note"], "Courier 123");
    assert_eq!(history[2]["actor"], "Administrador");

    // Going back is allowed too.
    let (status, body) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/orders/{}/status", order_id),
            Some(json!({ "status": "Recibido" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn unknown_status_is_rejected_without_touching_the_order() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Chaqueta", "400", None).await;
    let code = app.place_qr_order(product_id).await;
    let (_, list) = app.admin(Method::GET, "/api/v1/admin/orders", None).await;
    let order_id = list["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, body) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/orders/{}/status", order_id),
            Some(json!({ "status": "Enviado" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Enviado"));

    let (_, tracking) = app
        .public(Method::GET, &format!("/api/v1/orders/track/{}", code), None)
        .await;
    assert_eq!(tracking["data"]["status"], "Recibido");
    assert_eq!(tracking["data"]["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn status_change_on_missing_order_is_404() {
    let app = TestApp::new().await;
    let (status, _) = app
        .admin(
            Method::POST,
            "/api/v1/admin/orders/9999/status",
            Some(json!({ "status": "Entregado" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_status_and_channel() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Vestido", "500", None).await;
    app.place_qr_order(product_id).await;
    app.place_qr_order(product_id).await;
    let (status, _) = app
        .public(
            Method::POST,
            "/api/v1/checkout/whatsapp",
            Some(json!({ "product_id": product_id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, all) = app.admin(Method::GET, "/api/v1/admin/orders", None).await;
    assert_eq!(all["data"]["total"], 3);

    let (_, qr) = app
        .admin(Method::GET, "/api/v1/admin/orders?payment_method=qr", None)
        .await;
    assert_eq!(qr["data"]["total"], 2);

    let (_, delivered) = app
        .admin(Method::GET, "/api/v1/admin/orders?status=Entregado", None)
        .await;
    assert_eq!(delivered["data"]["total"], 0);

    let (status, _) = app
        .admin(Method::GET, "/api/v1/admin/orders?status=bogus", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, paged) = app
        .admin(Method::GET, "/api/v1/admin/orders?per_page=2&page=2", None)
        .await;
    assert_eq!(paged["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged["data"]["total_pages"], 2);
}

#[tokio::test]
async fn whatsapp_checkout_links_to_the_configured_number() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Pollera", "200", None).await;

    let (status, _) = app
        .admin(
            Method::PUT,
            "/api/v1/admin/contact",
            Some(json!({ "whatsapp": "+591 700-00000" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .public(
            Method::POST,
            "/api/v1/checkout/whatsapp",
            Some(json!({ "product_id": product_id, "total": "180.50" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let url = body["data"]["redirect_url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/59170000000?text="), "{url}");
    let code = body["data"]["order_code"].as_str().unwrap();
    assert!(url.contains(code));

    let (_, tracking) = app
        .public(Method::GET, &format!("/api/v1/orders/track/{}", code), None)
        .await;
    assert_eq!(decimal(&tracking["data"]["total"]), dec!(180.5));
}

#[tokio::test]
async fn checkout_for_missing_product_is_404_and_creates_nothing() {
    let app = TestApp::new().await;
    let (status, _) = app
        .public(
            Method::POST,
            "/api/v1/checkout/qr",
            Some(json!({ "product_id": 4242 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = app.admin(Method::GET, "/api/v1/admin/orders", None).await;
    assert_eq!(all["data"]["total"], 0);
}

#[tokio::test]
async fn deleting_an_order_removes_it_and_leaves_a_notification() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Manta", "75", None).await;
    let code = app.place_qr_order(product_id).await;
    let (_, list) = app.admin(Method::GET, "/api/v1/admin/orders", None).await;
    let order_id = list["data"]["items"][0]["id"].as_i64().unwrap();

    let (status, body) = app
        .admin(Method::DELETE, &format!("/api/v1/admin/orders/{}", order_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], true);

    let (status, _) = app
        .public(Method::GET, &format!("/api/v1/orders/track/{}", code), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, feed) = app
        .admin(Method::GET, "/api/v1/admin/notifications", None)
        .await;
    let messages: Vec<_> = feed["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["message"].as_str().unwrap().to_string())
        .collect();
    assert!(messages.iter().any(|m| m.contains(&code) && m.contains("eliminado")));
    assert!(messages.iter().any(|m| m.contains(&code) && m.contains("Nuevo pedido")));
}

#[tokio::test]
async fn products_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Blusa", "150", None).await;
    app.place_qr_order(product_id).await;

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/products/{}", product_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
