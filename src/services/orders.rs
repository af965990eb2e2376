use crate::{
    entities::{
        notification::NotificationKind,
        order::{self, Entity as Order, OrderStatus, PaymentMethod},
        order_history::{self, Entity as OrderHistory},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    metrics::{ORDERS_CREATED, ORDER_STATUS_UPDATES, ORDER_STATUS_UPDATE_FAILURES},
    services::{
        notifications,
        order_code::{self, CodeRegistry},
        page_window, Actor, Page,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Input for a new retail order. Checkout channels build this after the
/// shopper picks a product.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewOrder {
    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i32,
    pub payment_method: PaymentMethod,
    /// Defaults to the product's current price.
    pub total: Option<Decimal>,
    #[validate(length(max = 500))]
    pub image_url: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(skip)]
    pub payment_reference: Option<String>,
    /// First history note. Defaults to naming the channel.
    #[serde(skip)]
    pub history_note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    /// Matches the order code.
    pub search: Option<String>,
}

/// An order with its product and full status history, oldest entry first.
#[derive(Debug, Clone)]
pub struct OrderDetail {
    pub order: order::Model,
    pub product: Option<product::Model>,
    pub history: Vec<order_history::Model>,
}

struct OrderCodes<'a, C>(&'a C);

#[async_trait]
impl<C: ConnectionTrait> CodeRegistry for OrderCodes<'_, C> {
    async fn is_taken(&self, code: &str) -> Result<bool, ServiceError> {
        let count = Order::find()
            .filter(order::Column::OrderCode.eq(code))
            .count(self.0)
            .await?;
        Ok(count > 0)
    }
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    /// Creates an order and its first history entry in one transaction.
    /// The initial status depends on the payment channel.
    #[instrument(skip(self, input, actor), fields(product_id = input.product_id, payment_method = %input.payment_method))]
    pub async fn create_order(
        &self,
        input: NewOrder,
        actor: &Actor,
    ) -> Result<OrderDetail, ServiceError> {
        input.validate()?;
        if matches!(input.total, Some(total) if total.is_sign_negative()) {
            return Err(ServiceError::ValidationError(
                "total cannot be negative".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let product = Product::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let code = order_code::generate_unique_code(order_code::RETAIL_PREFIX, &OrderCodes(&txn))
            .await?;
        let status = input.payment_method.initial_status();
        let now = Utc::now();

        let order = order::ActiveModel {
            order_code: Set(code.clone()),
            product_id: Set(product.id),
            payment_method: Set(input.payment_method),
            total: Set(input.total.unwrap_or(product.price).round_dp(2)),
            status: Set(status),
            image_url: Set(input.image_url),
            notes: Set(input.notes),
            payment_reference: Set(input.payment_reference),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_code = %code, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        let note = input
            .history_note
            .unwrap_or_else(|| format!("Pedido creado via {}", input.payment_method));
        let first_entry = append_history(&txn, order.id, status, Some(note), actor)
        .await?;

        notifications::record(
            &txn,
            format!("Nuevo pedido {} ({})", order.order_code, input.payment_method),
            NotificationKind::Info,
            None,
        )
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_code = %code, "Failed to commit order creation");
            ServiceError::DatabaseError(e)
        })?;

        ORDERS_CREATED
            .with_label_values(&[input.payment_method.to_string().as_str()])
            .inc();
        info!(order_id = order.id, order_code = %order.order_code, %status, "Order created");
        self.emit(Event::OrderCreated {
            order_id: order.id,
            order_code: order.order_code.clone(),
            payment_method: input.payment_method.to_string(),
        })
        .await;

        Ok(OrderDetail {
            order,
            product: Some(product),
            history: vec![first_entry],
        })
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: i32) -> Result<OrderDetail, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;
        self.load_detail(order).await
    }

    /// Public tracking lookup. Codes are matched case-insensitively.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, code: &str) -> Result<OrderDetail, ServiceError> {
        let normalized = code.trim().to_uppercase();
        let order = Order::find()
            .filter(order::Column::OrderCode.eq(normalized.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", normalized)))?;
        self.load_detail(order).await
    }

    pub async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<order::Model>, ServiceError> {
        Ok(Order::find()
            .filter(order::Column::PaymentReference.eq(reference))
            .one(&*self.db)
            .await?)
    }

    /// Newest orders first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<(order::Model, Option<product::Model>)>, ServiceError> {
        let (page, per_page) = page_window(page, per_page, 100);
        let mut condition = Condition::all();
        if let Some(status) = filter.status {
            condition = condition.add(order::Column::Status.eq(status));
        }
        if let Some(method) = filter.payment_method {
            condition = condition.add(order::Column::PaymentMethod.eq(method));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(order::Column::OrderCode.contains(search.to_uppercase()));
        }

        let paginator = Order::find()
            .filter(condition)
            .find_also_related(Product)
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(Page {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Sets a new status and appends a history entry atomically. Any known
    /// status may follow any other; unknown labels fail before the database
    /// is touched.
    #[instrument(skip(self, note, actor))]
    pub async fn update_status(
        &self,
        id: i32,
        status: &str,
        note: Option<String>,
        actor: &Actor,
    ) -> Result<OrderDetail, ServiceError> {
        let new_status = OrderStatus::from_str(status.trim()).map_err(|_| {
            ORDER_STATUS_UPDATE_FAILURES.inc();
            ServiceError::InvalidStatus(format!("Unknown order status: {}", status))
        })?;
        let note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let txn = self.db.begin().await?;
        let existing = Order::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ORDER_STATUS_UPDATE_FAILURES.inc();
                ServiceError::NotFound(format!("Order {} not found", id))
            })?;
        let old_status = existing.status;

        let mut active: order::ActiveModel = existing.into();
        active.status = Set(new_status);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await.map_err(|e| {
            ORDER_STATUS_UPDATE_FAILURES.inc();
            error!(error = %e, order_id = id, "Failed to update order status");
            ServiceError::DatabaseError(e)
        })?;

        append_history(&txn, id, new_status, note, actor).await?;
        txn.commit().await?;

        ORDER_STATUS_UPDATES
            .with_label_values(&[new_status.to_string().as_str()])
            .inc();
        info!(order_id = id, %old_status, %new_status, actor = %actor.name, "Order status updated");
        self.emit(Event::OrderStatusChanged {
            order_id: id,
            old_status: old_status.to_string(),
            new_status: new_status.to_string(),
        })
        .await;

        self.load_detail(updated).await
    }

    /// Removes an order together with its history.
    #[instrument(skip(self, actor))]
    pub async fn delete_order(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let existing = Order::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        OrderHistory::delete_many()
            .filter(order_history::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;
        Order::delete_by_id(id).exec(&txn).await?;
        notifications::record(
            &txn,
            format!("Pedido {} eliminado", existing.order_code),
            NotificationKind::Danger,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        warn!(order_id = id, order_code = %existing.order_code, actor = %actor.name, "Order deleted");
        self.emit(Event::OrderDeleted(id)).await;
        Ok(())
    }

    pub async fn history(&self, order_id: i32) -> Result<Vec<order_history::Model>, ServiceError> {
        Ok(OrderHistory::find()
            .filter(order_history::Column::OrderId.eq(order_id))
            .order_by_asc(order_history::Column::CreatedAt)
            .order_by_asc(order_history::Column::Id)
            .all(&*self.db)
            .await?)
    }

    async fn load_detail(&self, order: order::Model) -> Result<OrderDetail, ServiceError> {
        let product = Product::find_by_id(order.product_id).one(&*self.db).await?;
        let history = self.history(order.id).await?;
        Ok(OrderDetail {
            order,
            product,
            history,
        })
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to publish order event");
            }
        }
    }
}

async fn append_history<C: ConnectionTrait>(
    conn: &C,
    order_id: i32,
    status: OrderStatus,
    note: Option<String>,
    actor: &Actor,
) -> Result<order_history::Model, ServiceError> {
    let entry = order_history::ActiveModel {
        order_id: Set(order_id),
        status: Set(status),
        note: Set(note),
        actor: Set(actor.name.clone()),
        actor_id: Set(actor.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(entry.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn unknown_status_is_rejected_without_touching_the_database() {
        // The mock has no canned results, so any query would fail.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let service = OrderService::new(Arc::new(db), None);

        let err = service
            .update_status(1, "Shipped", None, &Actor::system())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus(_)));
    }

    #[tokio::test]
    async fn negative_totals_are_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let service = OrderService::new(Arc::new(db), None);
        let input = NewOrder {
            product_id: 1,
            payment_method: PaymentMethod::Qr,
            total: Some(Decimal::new(-1, 0)),
            image_url: None,
            notes: None,
            payment_reference: None,
            history_note: None,
        };

        let err = service
            .create_order(input, &Actor::storefront())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
