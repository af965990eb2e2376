use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Garments the workshop makes. Each has its own measurement whitelist.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GarmentType {
    #[sea_orm(string_value = "pollera")]
    Pollera,
    #[sea_orm(string_value = "blusa")]
    Blusa,
    #[sea_orm(string_value = "manta")]
    Manta,
    #[sea_orm(string_value = "chaqueta")]
    Chaqueta,
    #[sea_orm(string_value = "vestido")]
    Vestido,
    #[sea_orm(string_value = "pantalon")]
    Pantalon,
}

impl GarmentType {
    /// Measurement keys recorded for this garment, in form order.
    pub fn measurement_fields(self) -> &'static [&'static str] {
        match self {
            GarmentType::Pollera => &["cintura", "cadera", "largo", "ruedo"],
            GarmentType::Blusa => &["busto", "cintura", "hombros", "largo", "manga", "cuello"],
            GarmentType::Manta => &["largo", "ancho"],
            GarmentType::Chaqueta => &["busto", "cintura", "hombros", "espalda", "largo", "manga"],
            GarmentType::Vestido => &["busto", "cintura", "cadera", "hombros", "largo", "manga"],
            GarmentType::Pantalon => &["cintura", "cadera", "largo", "entrepierna", "muslo", "basta"],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "custom_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub custom_order_id: i32,
    pub garment_type: GarmentType,
    /// Flat string map, keys limited to `garment_type.measurement_fields()`
    #[sea_orm(column_type = "Json")]
    pub measurements: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;
    use std::str::FromStr;

    #[test]
    fn every_garment_has_fields() {
        for garment in GarmentType::iter() {
            assert!(!garment.measurement_fields().is_empty(), "{garment}");
        }
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!(GarmentType::from_str("pantalon").unwrap(), GarmentType::Pantalon);
        assert!(GarmentType::from_str("sombrero").is_err());
    }
}
