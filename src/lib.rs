//! Modas Pathy API
//!
//! Storefront and back-office for a made-to-order apparel shop: retail orders
//! with status history, tailoring orders with per-garment measurements, the
//! product catalog, and the WhatsApp, QR, and PayPal checkout channels.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::ToSchema;

use crate::auth::{roles, AuthRouterExt, AuthService};
use crate::handlers::{
    catalog, checkout, custom_orders, dashboard, notifications, orders, products, profile,
    settings, themes, users,
};
use crate::middleware_helpers::{maintenance_middleware, request_id_middleware};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub event_sender: Arc<events::EventSender>,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> From<services::Page<T>> for PaginatedResponse<T> {
    fn from(page: services::Page<T>) -> Self {
        Self {
            total_pages: page.total_pages(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            items: page.items,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Routes mounted under `/api/v1`.
///
/// Storefront reads and checkout honour maintenance mode; order tracking,
/// theme, contact, and settings stay readable so the shop can render a
/// maintenance page. Everything under `/admin` needs a back-office token;
/// users and themes need a superadmin.
pub fn api_v1_routes(state: &AppState) -> Router<AppState> {
    let storefront = Router::new()
        .route("/catalog/home", get(catalog::home))
        .route("/catalog/products", get(catalog::list_products))
        .route("/catalog/products/:id", get(catalog::get_product))
        .route("/catalog/categories", get(catalog::list_categories))
        .route("/checkout/whatsapp", post(checkout::checkout_whatsapp))
        .route("/checkout/qr", post(checkout::checkout_qr))
        .route("/checkout/paypal/orders", post(checkout::create_paypal_order))
        .route("/checkout/paypal/capture", post(checkout::capture_paypal_order))
        .layer(middleware::from_fn_with_state(
            state.services.settings.clone(),
            maintenance_middleware,
        ));

    let public = Router::new()
        .route("/orders/track/:code", get(orders::track_order))
        .route("/theme", get(themes::active_theme))
        .route("/contact", get(settings::get_contact))
        .route("/settings", get(settings::get_settings));

    let admin = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/orders", get(orders::list_orders))
        .route(
            "/orders/:id",
            get(orders::get_order).delete(orders::delete_order),
        )
        .route("/orders/:id/status", post(orders::update_order_status))
        .route(
            "/custom-orders",
            get(custom_orders::list_custom_orders).post(custom_orders::create_custom_order),
        )
        .route(
            "/custom-orders/:id",
            get(custom_orders::get_custom_order)
                .put(custom_orders::update_custom_order)
                .delete(custom_orders::delete_custom_order),
        )
        .route(
            "/custom-orders/:id/status",
            post(custom_orders::update_custom_order_status),
        )
        .route("/custom-orders/:id/items", post(custom_orders::add_item))
        .route(
            "/custom-orders/:id/items/:item_id",
            axum::routing::put(custom_orders::edit_item).delete(custom_orders::delete_item),
        )
        .route("/clients", get(custom_orders::list_clients))
        .route("/clients/:id", get(custom_orders::get_client))
        .route(
            "/clients/:id/measurements/:garment",
            get(custom_orders::client_measurements),
        )
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/images", post(products::add_image))
        .route(
            "/products/:id/images/:image_id",
            axum::routing::delete(products::delete_image),
        )
        .route(
            "/products/:id/images/:image_id/main",
            post(products::set_main_image),
        )
        .route(
            "/categories",
            get(products::list_categories).post(products::create_category),
        )
        .route(
            "/categories/:id",
            get(products::get_category)
                .put(products::update_category)
                .delete(products::delete_category),
        )
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route("/notifications/:id/read", post(notifications::mark_read))
        .route("/contact", axum::routing::put(settings::update_contact))
        .route("/settings", axum::routing::put(settings::update_settings))
        .route(
            "/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .with_role(roles::ADMIN);

    let superadmin = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/themes", get(themes::list_themes).post(themes::create_theme))
        .route(
            "/themes/:id",
            get(themes::get_theme)
                .put(themes::update_theme)
                .delete(themes::delete_theme),
        )
        .route("/themes/:id/activate", post(themes::activate_theme))
        .with_role(roles::SUPERADMIN);

    Router::new()
        .merge(storefront)
        .merge(public)
        .nest("/admin", admin.merge(superadmin))
}

/// Puts the shared [`AuthService`] where `auth_middleware` looks for it.
async fn inject_auth(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> axum::response::Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// The full application router without transport layers (CORS,
/// compression, tracing), which the binary adds.
pub fn app_router(state: AppState) -> Router {
    // base64 image uploads are a third larger than the file itself
    let body_limit = state.config.max_upload_bytes.saturating_mul(2);

    Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/health", health::health_routes())
        .nest("/api/v1", api_v1_routes(&state))
        .nest("/auth", auth::auth_routes().with_state(state.auth.clone()))
        .nest_service(
            products::UPLOADS_PREFIX,
            ServeDir::new(&state.config.upload_dir),
        )
        .merge(openapi::swagger_ui())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(state.auth.clone(), inject_auth))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        assert!(!response.success);
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
    }

    #[test]
    fn pagination_carries_page_count() {
        let page = services::Page {
            items: vec![1, 2, 3],
            total: 31,
            page: 2,
            per_page: 15,
        };
        let response = PaginatedResponse::from(page);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items.len(), 3);
    }
}
