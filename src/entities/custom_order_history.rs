use super::custom_order::CustomOrderStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row for a tailoring order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_order_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub custom_order_id: i32,
    /// Order status at the time of the entry
    pub status: CustomOrderStatus,
    #[sea_orm(column_type = "Text")]
    pub note: String,
    pub actor: String,
    pub actor_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::custom_order::Entity",
        from = "Column::CustomOrderId",
        to = "super::custom_order::Column::Id",
        on_delete = "Cascade"
    )]
    CustomOrder,
}

impl Related<super::custom_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
