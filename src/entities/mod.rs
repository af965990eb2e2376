pub mod client;
pub mod commerce;
pub mod contact_info;
pub mod custom_order;
pub mod custom_order_history;
pub mod custom_order_item;
pub mod notification;
pub mod order;
pub mod order_history;
pub mod site_settings;
pub mod theme;
pub mod user;

pub use commerce::{category, product, product_image};
