use crate::{
    entities::{
        category::Entity as Category,
        custom_order::{self, CustomOrderStatus, Entity as CustomOrder},
        notification::{self, Entity as Notification},
        order::{self, Entity as Order, OrderStatus},
        product::{self, Entity as Product},
        user::Entity as User,
    },
    errors::ServiceError,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use std::sync::Arc;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub products: u64,
    pub active_products: u64,
    pub new_products: u64,
    pub trending_products: u64,
    pub featured_products: u64,
    pub categories: u64,
    pub users: u64,
    pub orders_by_status: Vec<(OrderStatus, u64)>,
    pub custom_orders_by_status: Vec<(CustomOrderStatus, u64)>,
    pub urgent_custom_orders: u64,
    pub top_viewed: Vec<product::Model>,
    pub recent_notifications: Vec<notification::Model>,
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db;
        let flagged = |column: product::Column| Product::find().filter(column.eq(true)).count(db);

        let mut orders_by_status = Vec::new();
        for status in OrderStatus::iter() {
            let count = Order::find()
                .filter(order::Column::Status.eq(status))
                .count(db)
                .await?;
            orders_by_status.push((status, count));
        }

        let mut custom_orders_by_status = Vec::new();
        for status in CustomOrderStatus::iter() {
            let count = CustomOrder::find()
                .filter(custom_order::Column::Status.eq(status))
                .count(db)
                .await?;
            // the legacy label only shows up when old rows still carry it
            if status.is_assignable() || count > 0 {
                custom_orders_by_status.push((status, count));
            }
        }

        Ok(DashboardStats {
            products: Product::find().count(db).await?,
            active_products: flagged(product::Column::IsActive).await?,
            new_products: flagged(product::Column::IsNew).await?,
            trending_products: flagged(product::Column::IsTrending).await?,
            featured_products: flagged(product::Column::IsFeatured).await?,
            categories: Category::find().count(db).await?,
            users: User::find().count(db).await?,
            orders_by_status,
            custom_orders_by_status,
            urgent_custom_orders: CustomOrder::find()
                .filter(custom_order::Column::IsUrgent.eq(true))
                .filter(custom_order::Column::Status.ne(CustomOrderStatus::Delivered))
                .count(db)
                .await?,
            top_viewed: Product::find()
                .order_by_desc(product::Column::Views)
                .limit(5)
                .all(db)
                .await?,
            recent_notifications: Notification::find()
                .order_by_desc(notification::Column::CreatedAt)
                .order_by_desc(notification::Column::Id)
                .limit(5)
                .all(db)
                .await?,
        })
    }
}
