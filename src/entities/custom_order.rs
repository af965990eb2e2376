use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workshop stages for a tailoring order.
///
/// `en proceso` predates the finer-grained stages. Old rows may still carry
/// it, so it stays readable, but [`CustomOrderStatus::is_assignable`] keeps it
/// from being set on anything new.
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
pub enum CustomOrderStatus {
    #[sea_orm(string_value = "pendiente")]
    #[serde(rename = "pendiente")]
    #[strum(serialize = "pendiente")]
    Pending,
    #[sea_orm(string_value = "diseno")]
    #[serde(rename = "diseno")]
    #[strum(serialize = "diseno")]
    Design,
    #[sea_orm(string_value = "corte")]
    #[serde(rename = "corte")]
    #[strum(serialize = "corte")]
    Cutting,
    #[sea_orm(string_value = "confeccion")]
    #[serde(rename = "confeccion")]
    #[strum(serialize = "confeccion")]
    Sewing,
    #[sea_orm(string_value = "prueba")]
    #[serde(rename = "prueba")]
    #[strum(serialize = "prueba")]
    Fitting,
    #[sea_orm(string_value = "ajustes")]
    #[serde(rename = "ajustes")]
    #[strum(serialize = "ajustes")]
    Adjustments,
    #[sea_orm(string_value = "listo")]
    #[serde(rename = "listo")]
    #[strum(serialize = "listo")]
    Ready,
    #[sea_orm(string_value = "entregado")]
    #[serde(rename = "entregado")]
    #[strum(serialize = "entregado")]
    Delivered,
    #[sea_orm(string_value = "en proceso")]
    #[serde(rename = "en proceso")]
    #[strum(serialize = "en proceso")]
    LegacyInProgress,
}

impl CustomOrderStatus {
    pub fn is_assignable(self) -> bool {
        !matches!(self, CustomOrderStatus::LegacyInProgress)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `PC-<year>-<6 digits>`
    #[sea_orm(unique)]
    pub code: String,
    pub client_id: i32,
    pub status: CustomOrderStatus,
    pub delivery_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub deposit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total: Decimal,
    pub is_urgent: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "Restrict"
    )]
    Client,
    #[sea_orm(has_many = "super::custom_order_item::Entity")]
    Items,
    #[sea_orm(has_many = "super::custom_order_history::Entity")]
    History,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::custom_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::custom_order_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn legacy_status_is_readable_but_not_assignable() {
        let legacy = CustomOrderStatus::from_str("en proceso").unwrap();
        assert_eq!(legacy, CustomOrderStatus::LegacyInProgress);
        assert!(!legacy.is_assignable());
        assert!(CustomOrderStatus::Fitting.is_assignable());
    }
}
