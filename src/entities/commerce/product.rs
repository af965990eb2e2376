use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog product. Prices are in local currency.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Pre-sale price; the product is "on sale" when this exceeds `price`
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub original_price: Option<Decimal>,
    pub stock: i32,
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: bool,
    pub is_new: bool,
    pub is_trending: bool,
    pub is_featured: bool,
    pub views: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn has_discount(&self) -> bool {
        matches!(self.original_price, Some(orig) if orig > self.price)
    }

    /// Whole-number discount, truncated toward zero.
    pub fn discount_percent(&self) -> i64 {
        match self.original_price {
            Some(orig) if orig > self.price && orig > Decimal::ZERO => {
                ((orig - self.price) / orig * Decimal::ONE_HUNDRED)
                    .trunc()
                    .to_i64()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
    #[sea_orm(has_many = "crate::entities::order::Entity")]
    Orders,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<crate::entities::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal, original: Option<Decimal>) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            name: "Pollera de gala".into(),
            slug: "pollera-de-gala".into(),
            description: None,
            price,
            original_price: original,
            stock: 3,
            sku: None,
            category_id: None,
            is_active: true,
            is_new: false,
            is_trending: false,
            is_featured: false,
            views: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn discount_is_truncated() {
        let p = product(dec!(200), Some(dec!(300)));
        assert!(p.has_discount());
        assert_eq!(p.discount_percent(), 33);
    }

    #[test]
    fn no_discount_without_higher_original_price() {
        assert!(!product(dec!(200), None).has_discount());
        let same = product(dec!(200), Some(dec!(200)));
        assert!(!same.has_discount());
        assert_eq!(same.discount_percent(), 0);
    }
}
