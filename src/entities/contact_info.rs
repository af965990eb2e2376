use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Singleton row with the shop's public contact channels.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contact_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Digits only, international format, used for wa.me links
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tiktok: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub telegram: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub schedule: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub map_embed: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
