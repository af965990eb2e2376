use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status vocabulary for retail orders, in the order they usually progress.
/// Any value may be assigned at any time.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum OrderStatus {
    #[sea_orm(string_value = "Pagado")]
    #[serde(rename = "Pagado")]
    #[strum(serialize = "Pagado")]
    Paid,
    #[sea_orm(string_value = "Recibido")]
    #[serde(rename = "Recibido")]
    #[strum(serialize = "Recibido")]
    Received,
    #[sea_orm(string_value = "Confeccionando")]
    #[serde(rename = "Confeccionando")]
    #[strum(serialize = "Confeccionando")]
    Tailoring,
    #[sea_orm(string_value = "Preparando envio")]
    #[serde(rename = "Preparando envio")]
    #[strum(serialize = "Preparando envio")]
    PreparingShipment,
    #[sea_orm(string_value = "En camino")]
    #[serde(rename = "En camino")]
    #[strum(serialize = "En camino")]
    InTransit,
    #[sea_orm(string_value = "Entregado")]
    #[serde(rename = "Entregado")]
    #[strum(serialize = "Entregado")]
    Delivered,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "whatsapp")]
    Whatsapp,
    #[sea_orm(string_value = "paypal")]
    Paypal,
    #[sea_orm(string_value = "qr")]
    Qr,
}

impl PaymentMethod {
    /// Orders confirmed by the card processor start out paid.
    pub fn initial_status(self) -> OrderStatus {
        match self {
            PaymentMethod::Paypal => OrderStatus::Paid,
            PaymentMethod::Whatsapp | PaymentMethod::Qr => OrderStatus::Received,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `MP-<year>-<6 digits>`
    #[sea_orm(unique)]
    pub order_code: String,
    pub product_id: i32,
    pub payment_method: PaymentMethod,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Remote order id for processor payments
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Restrict"
    )]
    Product,
    #[sea_orm(has_many = "super::order_history::Entity")]
    History,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::order_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;
    use std::str::FromStr;

    #[test]
    fn status_labels_round_trip_through_from_str() {
        for status in OrderStatus::iter() {
            assert_eq!(OrderStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert_eq!(OrderStatus::PreparingShipment.to_string(), "Preparando envio");
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(OrderStatus::from_str("Cancelado").is_err());
        assert!(OrderStatus::from_str("pagado").is_err());
    }

    #[test]
    fn initial_status_depends_on_channel() {
        assert_eq!(PaymentMethod::Paypal.initial_status(), OrderStatus::Paid);
        assert_eq!(PaymentMethod::Whatsapp.initial_status(), OrderStatus::Received);
        assert_eq!(PaymentMethod::Qr.initial_status(), OrderStatus::Received);
    }

    #[test]
    fn status_serializes_with_storefront_label() {
        let json = serde_json::to_string(&OrderStatus::InTransit).unwrap();
        assert_eq!(json, "\"En camino\"");
    }
}
