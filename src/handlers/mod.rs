pub mod catalog;
pub mod checkout;
pub mod common;
pub mod custom_orders;
pub mod dashboard;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod profile;
pub mod settings;
pub mod themes;
pub mod users;

use crate::{
    config::AppConfig,
    events::EventSender,
    services::{
        catalog::CatalogService,
        categories::CategoryService,
        checkout::{CheckoutService, PaymentTerms},
        contact::ContactService,
        custom_orders::CustomOrderService,
        dashboard::DashboardService,
        images::ImageStore,
        notifications::NotificationService,
        orders::OrderService,
        payments::PaymentGateway,
        products::ProductService,
        settings::SettingsService,
        themes::ThemeService,
        users::UserService,
    },
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub checkout: Arc<CheckoutService>,
    pub custom_orders: Arc<CustomOrderService>,
    pub catalog: Arc<CatalogService>,
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub themes: Arc<ThemeService>,
    pub users: Arc<UserService>,
    pub settings: Arc<SettingsService>,
    pub contact: Arc<ContactService>,
    pub notifications: Arc<NotificationService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Wires every service against one connection pool. The payment gateway
    /// is injected so tests can point it at a stub server.
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let events = Some(event_sender);
        let orders = Arc::new(OrderService::new(db.clone(), events.clone()));
        let terms = PaymentTerms {
            currency: config.paypal_currency.clone(),
            percent_fee: config.paypal_percent_fee,
            fixed_fee: config.paypal_fixed_fee,
            fallback_rate: config.fallback_exchange_rate,
        };
        let checkout = Arc::new(CheckoutService::new(
            db.clone(),
            orders.clone(),
            gateway,
            terms,
            config.storefront_base_url.clone(),
        ));
        let images = ImageStore::new(config.upload_dir.clone(), config.max_upload_bytes);

        Self {
            orders,
            checkout,
            custom_orders: Arc::new(CustomOrderService::new(db.clone(), events.clone())),
            catalog: Arc::new(CatalogService::new(db.clone())),
            categories: Arc::new(CategoryService::new(db.clone())),
            products: Arc::new(ProductService::new(db.clone(), images, events.clone())),
            themes: Arc::new(ThemeService::new(db.clone(), events.clone())),
            users: Arc::new(UserService::new(db.clone())),
            settings: Arc::new(SettingsService::new(db.clone(), events)),
            contact: Arc::new(ContactService::new(db.clone())),
            notifications: Arc::new(NotificationService::new(db.clone())),
            dashboard: Arc::new(DashboardService::new(db)),
        }
    }
}
