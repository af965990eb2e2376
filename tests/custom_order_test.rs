//! Tailoring orders: creation with garments, measurement filtering, the
//! client measurement cache, item edits with diff notes, and stage changes.

mod common;

use axum::http::{Method, StatusCode};
use common::{decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn create_order(app: &TestApp, body: Value) -> Value {
    let (status, response) = app
        .admin(Method::POST, "/api/v1/admin/custom-orders", Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{response}");
    response["data"].clone()
}

fn pollera_order(phone: &str) -> Value {
    json!({
        "client_name": "Rosa Quispe",
        "client_phone": phone,
        "delivery_date": "2026-12-01",
        "total": "800",
        "deposit": "300",
        "items": [{
            "garment_type": "Pollera",
            "measurements": { "cintura": "72", "largo": "95", "busto": "88" },
            "notes": "Bordado dorado"
        }]
    })
}

async fn cached_measurements(app: &TestApp, client_id: i64, garment: &str) -> Value {
    let uri = format!("/api/v1/admin/clients/{}/measurements/{}", client_id, garment);
    let (status, body) = app.admin(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["measurements"].clone()
}

#[tokio::test]
async fn creation_filters_measurements_and_records_history() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70011111")).await;

    assert!(order["code"].as_str().unwrap().starts_with("PC-"));
    assert_eq!(order["status"], "pendiente");
    assert_eq!(decimal(&order["balance"]), dec!(500));
    assert_eq!(order["client"]["name"], "Rosa Quispe");
    assert_eq!(order["garment_type"], "pollera");
    // `busto` is not a pollera measurement.
    assert_eq!(
        order["measurements"],
        json!({ "cintura": "72", "largo": "95" })
    );
    let history = order["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0]["note"].as_str().unwrap().contains("1 prenda"));
}

#[tokio::test]
async fn orders_need_at_least_one_known_garment() {
    let app = TestApp::new().await;
    let mut empty = pollera_order("70022222");
    empty["items"] = json!([]);
    let (status, _) = app
        .admin(Method::POST, "/api/v1/admin/custom-orders", Some(empty))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown = pollera_order("70022222");
    unknown["items"][0]["garment_type"] = json!("sombrero");
    let (status, _) = app
        .admin(Method::POST, "/api/v1/admin/custom-orders", Some(unknown))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, clients) = app.admin(Method::GET, "/api/v1/admin/clients", None).await;
    assert_eq!(clients["data"]["total"], 0);
}

#[tokio::test]
async fn clients_are_matched_by_phone_and_remember_measurements() {
    let app = TestApp::new().await;
    let first = create_order(&app, pollera_order("70033333")).await;

    let mut second = pollera_order("70033333");
    second["client_name"] = json!("Rosa Quispe Mamani");
    second["items"] = json!([{ "garment_type": "blusa", "measurements": {} }]);
    let second = create_order(&app, second).await;
    assert_eq!(first["client"]["id"], second["client"]["id"]);

    let client_id = first["client"]["id"].as_i64().unwrap();
    let (status, detail) = app
        .admin(Method::GET, &format!("/api/v1/admin/clients/{}", client_id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["data"]["client"]["name"], "Rosa Quispe Mamani");
    assert_eq!(detail["data"]["orders"].as_array().unwrap().len(), 2);

    let (_, pollera) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/clients/{}/measurements/pollera", client_id),
            None,
        )
        .await;
    assert_eq!(
        pollera["data"]["measurements"],
        json!({ "cintura": "72", "largo": "95" })
    );

    // Empty measurement sets do not overwrite the cache.
    let (_, blusa) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/clients/{}/measurements/blusa", client_id),
            None,
        )
        .await;
    assert_eq!(blusa["data"]["measurements"], json!({}));

    let (status, _) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/clients/{}/measurements/capa", client_id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn editing_an_item_records_a_measurement_diff() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70044444")).await;
    let id = order["id"].as_i64().unwrap();
    let item_id = order["items"][0]["id"].as_i64().unwrap();

    let (status, updated) = app
        .admin(
            Method::PUT,
            &format!("/api/v1/admin/custom-orders/{}/items/{}", id, item_id),
            Some(json!({
                "garment_type": "pollera",
                "measurements": { "cintura": "74", "ruedo": "300" },
                "notes": "Bordado dorado"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");

    let history = updated["data"]["history"].as_array().unwrap();
    let note = history.last().unwrap()["note"].as_str().unwrap();
    assert!(note.contains("cintura: 72 → 74"), "{note}");
    assert!(note.contains("+ ruedo: 300"), "{note}");
    assert!(note.contains("- largo"), "{note}");
    assert_eq!(updated["data"]["status"], "pendiente");
}

#[tokio::test]
async fn the_last_garment_cannot_be_removed() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70055555")).await;
    let id = order["id"].as_i64().unwrap();
    let first_item = order["items"][0]["id"].as_i64().unwrap();

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/custom-orders/{}/items/{}", id, first_item),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, added) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/custom-orders/{}/items", id),
            Some(json!({ "garment_type": "manta", "measurements": { "largo": "150", "ancho": "120" } })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(added["data"]["items"].as_array().unwrap().len(), 2);

    let (status, after) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/custom-orders/{}/items/{}", id, first_item),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["data"]["garment_type"], "manta");

    let history = after["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.last().unwrap()["note"],
        "Prenda eliminada: pollera"
    );
}

#[tokio::test]
async fn removing_a_garment_keeps_the_client_measurements() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70056565")).await;
    let id = order["id"].as_i64().unwrap();
    let client_id = order["client"]["id"].as_i64().unwrap();
    let pollera_item = order["items"][0]["id"].as_i64().unwrap();

    let (status, _) = app
        .admin(
            Method::POST,
            &format!("/api/v1/admin/custom-orders/{}/items", id),
            Some(json!({ "garment_type": "manta", "measurements": { "largo": "150", "ancho": "120" } })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let manta_before = cached_measurements(&app, client_id, "manta").await;
    assert_eq!(manta_before, json!({ "largo": "150", "ancho": "120" }));
    let pollera_before = cached_measurements(&app, client_id, "pollera").await;

    let (status, after) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/custom-orders/{}/items/{}", id, pollera_item),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{after}");
    let note = after["data"]["history"].as_array().unwrap().last().unwrap()["note"].clone();
    assert_eq!(note, "Prenda eliminada: pollera");

    assert_eq!(cached_measurements(&app, client_id, "manta").await, manta_before);
    assert_eq!(cached_measurements(&app, client_id, "pollera").await, pollera_before);
    assert_eq!(pollera_before, json!({ "cintura": "72", "largo": "95" }));
}

#[tokio::test]
async fn items_from_another_order_are_not_found() {
    let app = TestApp::new().await;
    let a = create_order(&app, pollera_order("70066666")).await;
    let b = create_order(&app, pollera_order("70077777")).await;

    let (status, _) = app
        .admin(
            Method::PUT,
            &format!(
                "/api/v1/admin/custom-orders/{}/items/{}",
                a["id"],
                b["items"][0]["id"]
            ),
            Some(json!({ "garment_type": "pollera" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stage_changes_accept_only_current_stages() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70088888")).await;
    let uri = format!("/api/v1/admin/custom-orders/{}/status", order["id"]);

    let (status, body) = app
        .admin(
            Method::POST,
            &uri,
            Some(json!({ "status": "corte", "note": "Tela llegó" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "corte");
    let note = body["data"]["history"].as_array().unwrap().last().unwrap()["note"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(note.contains("pendiente → corte"));
    assert!(note.contains("Tela llegó"));

    for rejected in ["en proceso", "terminado"] {
        let (status, _) = app
            .admin(Method::POST, &uri, Some(json!({ "status": rejected })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{rejected}");
    }
}

#[tokio::test]
async fn updates_list_the_changed_fields() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70099999")).await;
    let uri = format!("/api/v1/admin/custom-orders/{}", order["id"]);

    let (status, body) = app
        .admin(
            Method::PUT,
            &uri,
            Some(json!({ "deposit": "500", "is_urgent": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["balance"]), dec!(300));
    let note = body["data"]["history"].as_array().unwrap().last().unwrap()["note"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(note.contains("anticipo"));
    assert!(note.contains("urgencia"));

    // No-op updates leave no trace.
    let (_, again) = app
        .admin(Method::PUT, &uri, Some(json!({ "is_urgent": true })))
        .await;
    assert_eq!(again["data"]["history"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .admin(Method::PUT, &uri, Some(json!({ "deposit": "-1" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivery_dates_can_be_moved_and_cleared() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("70099988")).await;
    assert_eq!(order["delivery_date"], "2026-12-01");
    let uri = format!("/api/v1/admin/custom-orders/{}", order["id"]);

    let (status, moved) = app
        .admin(Method::PUT, &uri, Some(json!({ "delivery_date": "2026-12-20" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{moved}");
    assert_eq!(moved["data"]["delivery_date"], "2026-12-20");

    // Leaving the field out keeps the date.
    let (_, kept) = app
        .admin(Method::PUT, &uri, Some(json!({ "notes": "Con forro" })))
        .await;
    assert_eq!(kept["data"]["delivery_date"], "2026-12-20");

    let (status, cleared) = app
        .admin(Method::PUT, &uri, Some(json!({ "delivery_date": null })))
        .await;
    assert_eq!(status, StatusCode::OK, "{cleared}");
    assert!(cleared["data"]["delivery_date"].is_null());
    let history = cleared["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 4);
    assert!(history.last().unwrap()["note"]
        .as_str()
        .unwrap()
        .contains("fecha de entrega"));
}

#[tokio::test]
async fn urgent_orders_list_first_and_filters_apply() {
    let app = TestApp::new().await;
    create_order(&app, pollera_order("71000001")).await;
    let mut urgent = pollera_order("71000002");
    urgent["client_name"] = json!("Ana Mamani");
    urgent["is_urgent"] = json!(true);
    let urgent = create_order(&app, urgent).await;

    let (_, all) = app
        .admin(Method::GET, "/api/v1/admin/custom-orders", None)
        .await;
    assert_eq!(all["data"]["total"], 2);
    assert_eq!(all["data"]["items"][0]["id"], urgent["id"]);

    let (_, only_urgent) = app
        .admin(Method::GET, "/api/v1/admin/custom-orders?urgent=true", None)
        .await;
    assert_eq!(only_urgent["data"]["total"], 1);

    let (_, by_name) = app
        .admin(Method::GET, "/api/v1/admin/custom-orders?search=Ana", None)
        .await;
    assert_eq!(by_name["data"]["total"], 1);

    let (status, _) = app
        .admin(Method::GET, "/api/v1/admin/custom-orders?status=volando", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_keeps_the_client() {
    let app = TestApp::new().await;
    let order = create_order(&app, pollera_order("71000003")).await;

    let (status, _) = app
        .admin(
            Method::DELETE,
            &format!("/api/v1/admin/custom-orders/{}", order["id"]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/custom-orders/{}", order["id"]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, client) = app
        .admin(
            Method::GET,
            &format!("/api/v1/admin/clients/{}", order["client"]["id"]),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client["data"]["orders"].as_array().unwrap().len(), 0);
}
