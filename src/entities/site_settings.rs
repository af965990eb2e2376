use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Singleton row with site-wide settings.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_name: String,
    pub tagline: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub show_prices: bool,
    pub maintenance_mode: bool,
    /// Local currency units per settlement currency unit
    #[sea_orm(column_type = "Decimal(Some((10, 4)))", nullable)]
    pub exchange_rate: Option<Decimal>,
    pub qr_image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
