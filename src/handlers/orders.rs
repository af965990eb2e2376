use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::AuthUser,
    entities::{
        order::{self, OrderStatus, PaymentMethod},
        order_history, product,
    },
    errors::ServiceError,
    handlers::common::{
        non_empty, ok, validate_input, ApiResult, DeletedResponse, StatusChangeRequest,
    },
    services::orders::{OrderDetail, OrderFilter},
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderProduct {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
}

impl From<product::Model> for OrderProduct {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            price: model.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderHistoryEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl From<order_history::Model> for OrderHistoryEntry {
    fn from(model: order_history::Model) -> Self {
        Self {
            status: model.status,
            note: model.note,
            actor: model.actor,
            created_at: model.created_at,
        }
    }
}

/// Row in the admin order list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: i32,
    pub order_code: String,
    pub product: Option<OrderProduct>,
    pub payment_method: PaymentMethod,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<(order::Model, Option<product::Model>)> for OrderSummary {
    fn from((order, product): (order::Model, Option<product::Model>)) -> Self {
        Self {
            id: order.id,
            order_code: order.order_code,
            product: product.map(OrderProduct::from),
            payment_method: order.payment_method,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub order_code: String,
    pub product: Option<OrderProduct>,
    pub payment_method: PaymentMethod,
    pub total: Decimal,
    pub status: OrderStatus,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    pub payment_reference: Option<String>,
    pub history: Vec<OrderHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        let order = detail.order;
        Self {
            id: order.id,
            order_code: order.order_code,
            product: detail.product.map(OrderProduct::from),
            payment_method: order.payment_method,
            total: order.total,
            status: order.status,
            image_url: order.image_url,
            notes: order.notes,
            payment_reference: order.payment_reference,
            history: detail.history.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// What a shopper sees when tracking an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrackingResponse {
    pub order_code: String,
    pub product: Option<OrderProduct>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub history: Vec<OrderHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderDetail> for TrackingResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            order_code: detail.order.order_code,
            product: detail.product.map(OrderProduct::from),
            total: detail.order.total,
            status: detail.order.status,
            history: detail.history.into_iter().map(Into::into).collect(),
            created_at: detail.order.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub per_page: Option<u64>,
    /// Status label, e.g. `Recibido`.
    pub status: Option<String>,
    /// `whatsapp`, `paypal` or `qr`.
    pub payment_method: Option<String>,
    /// Part of an order code.
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

impl OrderListQuery {
    fn filter(self) -> Result<OrderFilter, ServiceError> {
        let status = non_empty(self.status)
            .map(|raw| {
                OrderStatus::from_str(raw.trim()).map_err(|_| {
                    ServiceError::InvalidStatus(format!("Unknown order status: {}", raw))
                })
            })
            .transpose()?;
        let payment_method = non_empty(self.payment_method)
            .map(|raw| {
                PaymentMethod::from_str(raw.trim().to_lowercase().as_str()).map_err(|_| {
                    ServiceError::ValidationError(format!("Unknown payment method: {}", raw))
                })
            })
            .transpose()?;
        Ok(OrderFilter {
            status,
            payment_method,
            search: non_empty(self.search),
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/track/{code}",
    summary = "Track order",
    description = "Public status page for an order code such as MP-2025-004211",
    params(("code" = String, Path, description = "Order code")),
    responses(
        (status = 200, description = "Order found", body = ApiResponse<TrackingResponse>),
        (status = 404, description = "Unknown order code", body = crate::errors::ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn track_order(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<TrackingResponse> {
    let detail = state.services.orders.find_by_code(&code).await?;
    ok(detail.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    summary = "List orders",
    description = "Newest first, with optional status, channel and code filters",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders retrieved", body = ApiResponse<PaginatedResponse<OrderSummary>>),
        (status = 400, description = "Unknown status or payment method", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<PaginatedResponse<OrderSummary>> {
    let page = query.page;
    let per_page = query.per_page.unwrap_or(20);
    let result = state
        .services
        .orders
        .list_orders(query.filter()?, page, per_page)
        .await?;
    ok(result.map(OrderSummary::from).into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/orders/{id}",
    summary = "Get order",
    description = "Order with its product and full status history",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order retrieved", body = ApiResponse<OrderResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<OrderResponse> {
    ok(state.services.orders.get_order(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/orders/{id}/status",
    summary = "Change order status",
    description = "Any known status may follow any other. Each change appends a history entry.",
    params(("id" = i32, Path, description = "Order id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<OrderResponse>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<StatusChangeRequest>,
) -> ApiResult<OrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .orders
        .update_status(id, &payload.status, payload.note, &auth_user.actor())
        .await?;
    ok(detail.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/orders/{id}",
    summary = "Delete order",
    description = "Removes the order and its history",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .orders
        .delete_order(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}
