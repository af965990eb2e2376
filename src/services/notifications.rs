use crate::{
    entities::notification::{self, Entity as Notification, NotificationKind},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::instrument;

/// Appends a back-office notification. Runs on whatever connection or
/// transaction the caller is using.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    message: impl Into<String>,
    kind: NotificationKind,
    admin_name: Option<&str>,
) -> Result<notification::Model, ServiceError> {
    let model = notification::ActiveModel {
        message: Set(message.into()),
        kind: Set(kind),
        admin_name: Set(admin_name.map(str::to_string)),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(model.insert(conn).await?)
}

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        unread_only: bool,
        limit: u64,
    ) -> Result<Vec<notification::Model>, ServiceError> {
        let mut query = Notification::find();
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        Ok(query
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .limit(limit.clamp(1, 200))
            .all(&*self.db)
            .await?)
    }

    pub async fn unread_count(&self) -> Result<u64, ServiceError> {
        Ok(Notification::find()
            .filter(notification::Column::IsRead.eq(false))
            .count(&*self.db)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn mark_read(&self, id: i32) -> Result<notification::Model, ServiceError> {
        let existing = Notification::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Notification {} not found", id)))?;
        let mut active: notification::ActiveModel = existing.into();
        active.is_read = Set(true);
        Ok(active.update(&*self.db).await?)
    }

    /// Returns how many notifications were flipped.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<u64, ServiceError> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
