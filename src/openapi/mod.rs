use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{
    catalog, checkout, common, custom_orders, dashboard, notifications, orders, products, profile,
    settings, themes, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Modas Pathy API",
        version = "1.0.0",
        description = r#"
# Modas Pathy

Storefront and back-office for a made-to-order apparel shop.

## Areas

- **Catalog**: public product listing, search and home page sections
- **Checkout**: WhatsApp, QR transfer and PayPal orders
- **Tracking**: public order lookup by order code
- **Orders**: retail order lifecycle with status history
- **Custom orders**: tailoring orders with per-garment measurements
- **Back-office**: products, categories, themes, users, settings and the notification feed

## Authentication

Back-office endpoints require a bearer token from `POST /auth/login`:

```
Authorization: Bearer <token>
```

User and theme management is limited to superadmins.

## Errors

```json
{
  "error": "Bad Request",
  "message": "Invalid status: enviado",
  "request_id": "…",
  "timestamp": "2026-01-01T00:00:00Z"
}
```

## Pagination

List endpoints take `page` (from 1) and `per_page`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and logout"),
        (name = "catalog", description = "Public catalog"),
        (name = "checkout", description = "Storefront checkout channels"),
        (name = "orders", description = "Retail orders and public tracking"),
        (name = "custom-orders", description = "Tailoring orders and clients"),
        (name = "products", description = "Product and category administration"),
        (name = "themes", description = "Storefront themes"),
        (name = "users", description = "Back-office accounts"),
        (name = "settings", description = "Site settings and contact details"),
        (name = "notifications", description = "Admin activity feed"),
        (name = "dashboard", description = "Back-office summary")
    ),
    paths(
        crate::auth::login_handler,
        crate::auth::logout_handler,

        catalog::home,
        catalog::list_products,
        catalog::get_product,
        catalog::list_categories,

        checkout::checkout_whatsapp,
        checkout::checkout_qr,
        checkout::create_paypal_order,
        checkout::capture_paypal_order,

        orders::track_order,
        orders::list_orders,
        orders::get_order,
        orders::update_order_status,
        orders::delete_order,

        custom_orders::list_custom_orders,
        custom_orders::create_custom_order,
        custom_orders::get_custom_order,
        custom_orders::update_custom_order,
        custom_orders::delete_custom_order,
        custom_orders::update_custom_order_status,
        custom_orders::add_item,
        custom_orders::edit_item,
        custom_orders::delete_item,
        custom_orders::list_clients,
        custom_orders::get_client,
        custom_orders::client_measurements,

        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::add_image,
        products::set_main_image,
        products::delete_image,
        products::list_categories,
        products::get_category,
        products::create_category,
        products::update_category,
        products::delete_category,

        themes::active_theme,
        themes::list_themes,
        themes::get_theme,
        themes::create_theme,
        themes::update_theme,
        themes::delete_theme,
        themes::activate_theme,

        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        profile::get_profile,
        profile::update_profile,

        settings::get_contact,
        settings::update_contact,
        settings::get_settings,
        settings::update_settings,

        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,

        dashboard::get_dashboard,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::errors::ErrorResponse,
            crate::auth::LoginCredentials,
            crate::auth::TokenResponse,

            crate::entities::order::OrderStatus,
            crate::entities::order::PaymentMethod,
            crate::entities::custom_order::CustomOrderStatus,
            crate::entities::custom_order_item::GarmentType,
            crate::entities::notification::NotificationKind,

            common::StatusChangeRequest,
            common::DeletedResponse,

            catalog::ProductDetailResponse,
            catalog::HomeResponse,
            crate::services::catalog::CatalogSort,

            crate::services::checkout::CheckoutRequest,
            crate::services::checkout::CheckoutResponse,
            crate::services::checkout::PaypalOrderRequest,
            crate::services::checkout::PaypalOrderResponse,
            crate::services::checkout::PaypalCaptureRequest,
            crate::services::orders::NewOrder,

            orders::OrderProduct,
            orders::OrderHistoryEntry,
            orders::OrderSummary,
            orders::OrderResponse,
            orders::TrackingResponse,

            custom_orders::ClientRef,
            custom_orders::GarmentItemResponse,
            custom_orders::CustomOrderHistoryEntry,
            custom_orders::CustomOrderSummary,
            custom_orders::CustomOrderResponse,
            custom_orders::ClientResponse,
            custom_orders::ClientDetailResponse,
            custom_orders::MeasurementsResponse,
            crate::services::custom_orders::GarmentItemInput,
            crate::services::custom_orders::NewCustomOrder,
            crate::services::custom_orders::UpdateCustomOrder,

            products::ImageResponse,
            products::CategoryRef,
            products::ProductResponse,
            products::CategoryResponse,
            crate::services::products::ProductInput,
            crate::services::products::ImageUpload,
            crate::services::categories::CategoryInput,

            themes::ThemeResponse,
            crate::services::themes::ThemeInput,

            users::UserResponse,
            crate::services::users::NewUser,
            crate::services::users::UpdateUser,
            crate::services::users::UpdateProfile,

            settings::ContactResponse,
            settings::SettingsResponse,
            crate::services::contact::UpdateContactInfo,
            crate::services::settings::UpdateSiteSettings,

            notifications::NotificationResponse,
            notifications::NotificationFeed,
            notifications::MarkedRead,

            dashboard::OrderStatusCount,
            dashboard::CustomOrderStatusCount,
            dashboard::TopProduct,
            dashboard::DashboardResponse,
        )
    )
)]
pub struct ApiDocV1;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

/// Pretty-printed document, as written by the export binary.
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ApiDocV1::openapi())
}
