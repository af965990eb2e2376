#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use modas_pathy_api::{
    app_router,
    auth::{AuthConfig, AuthService},
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    services::{
        payments::{paypal::PaypalGateway, PaymentGateway},
        seed,
    },
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-pass-123";

/// Full application router over a throwaway SQLite file, with one admin and
/// one superadmin account.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin_token: String,
    pub superadmin_token: String,
    pub admin_id: i32,
    pub superadmin_id: i32,
    _dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(None).await
    }

    /// Points the PayPal client at `base_url` (usually a wiremock server).
    pub async fn with_paypal(base_url: &str) -> Self {
        Self::build(Some(base_url.to_string())).await
    }

    async fn build(paypal_base_url: Option<String>) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("modas_test.db");
        let upload_dir = dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("upload dir");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;
        cfg.upload_dir = upload_dir.display().to_string();
        cfg.storefront_base_url = "https://tienda.test".to_string();
        if let Some(base) = paypal_base_url {
            cfg.paypal_base_url = base;
            cfg.paypal_client_id = Some("client-id".to_string());
            cfg.paypal_client_secret = Some("client-secret".to_string());
        }

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        seed::seed_defaults(&pool, &cfg)
            .await
            .expect("seed defaults");

        let admin = seed::create_admin(&pool, "staff", ADMIN_PASSWORD, false)
            .await
            .expect("create admin");
        let superadmin = seed::create_admin(&pool, "owner", ADMIN_PASSWORD, true)
            .await
            .expect("create superadmin");

        let db_arc = Arc::new(pool);
        let cfg = Arc::new(cfg);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let auth = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&cfg),
            db_arc.clone(),
        ));
        let admin_token = auth
            .generate_token(&admin)
            .expect("admin token")
            .access_token;
        let superadmin_token = auth
            .generate_token(&superadmin)
            .expect("superadmin token")
            .access_token;

        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(PaypalGateway::from_app_config(&cfg).expect("paypal client"));
        let services = AppServices::new(db_arc.clone(), event_sender.clone(), &cfg, gateway);

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
            auth,
        };

        Self {
            router: app_router(state.clone()),
            state,
            admin_token,
            superadmin_token,
            admin_id: admin.id,
            superadmin_id: superadmin.id,
            _dir: dir,
            _event_task: event_task,
        }
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn public(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.call(method, uri, body, None).await
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.admin_token.clone();
        self.call(method, uri, body, Some(&token)).await
    }

    pub async fn superadmin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.superadmin_token.clone();
        self.call(method, uri, body, Some(&token)).await
    }

    /// Creates an active category through the admin API and returns its id.
    pub async fn create_category(&self, name: &str) -> i64 {
        let (status, body) = self
            .admin(
                Method::POST,
                "/api/v1/admin/categories",
                Some(json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create category: {body}");
        body["data"]["id"].as_i64().expect("category id")
    }

    /// Creates a product through the admin API and returns its id.
    pub async fn create_product(&self, name: &str, price: &str, category_id: Option<i64>) -> i64 {
        let (status, body) = self
            .admin(
                Method::POST,
                "/api/v1/admin/products",
                Some(json!({
                    "name": name,
                    "price": price,
                    "stock": 3,
                    "category_id": category_id,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product: {body}");
        body["data"]["id"].as_i64().expect("product id")
    }

    /// Places a QR checkout for `product_id` and returns the order code.
    pub async fn place_qr_order(&self, product_id: i64) -> String {
        let (status, body) = self
            .public(
                Method::POST,
                "/api/v1/checkout/qr",
                Some(json!({ "product_id": product_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "qr checkout: {body}");
        body["data"]["order_code"]
            .as_str()
            .expect("order code")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    }
}

/// Reads a decimal that may be serialized as a string or a number. SQLite
/// keeps decimals as floats, so the scale is not preserved.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    use std::str::FromStr;
    match value {
        Value::String(s) => rust_decimal::Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => rust_decimal::Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}
