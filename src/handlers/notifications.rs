use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    entities::notification::{self, NotificationKind},
    handlers::common::{ok, ApiResult},
    ApiResponse, AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub message: String,
    pub kind: NotificationKind,
    pub admin_name: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            message: model.message,
            kind: model.kind,
            admin_name: model.admin_name,
            is_read: model.is_read,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationFeed {
    pub unread: u64,
    pub items: Vec<NotificationResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    /// Defaults to 50.
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/notifications",
    summary = "Notification feed",
    description = "Latest first, with the unread count",
    params(NotificationQuery),
    responses((status = 200, description = "Notifications retrieved", body = ApiResponse<NotificationFeed>)),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<NotificationFeed> {
    let service = &state.services.notifications;
    let items = service
        .list(query.unread_only, query.limit.unwrap_or(50))
        .await?;
    ok(NotificationFeed {
        unread: service.unread_count().await?,
        items: items.into_iter().map(Into::into).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications/{id}/read",
    summary = "Mark notification read",
    params(("id" = i32, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<NotificationResponse> {
    ok(state.services.notifications.mark_read(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications/read-all",
    summary = "Mark all notifications read",
    responses((status = 200, description = "Marked read", body = ApiResponse<MarkedRead>)),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_all_read(State(state): State<AppState>) -> ApiResult<MarkedRead> {
    let updated = state.services.notifications.mark_all_read().await?;
    ok(MarkedRead { updated })
}
