use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::AuthUser,
    entities::{
        client,
        custom_order::{self, CustomOrderStatus},
        custom_order_history,
        custom_order_item::{self, GarmentType},
    },
    errors::ServiceError,
    handlers::common::{
        created, non_empty, ok, validate_input, ApiResult, Created, DeletedResponse,
        PaginationParams, StatusChangeRequest,
    },
    services::{
        custom_orders::{
            parse_status, CustomOrderDetail, CustomOrderFilter, GarmentItemInput, NewCustomOrder,
            UpdateCustomOrder,
        },
        measurements,
    },
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientRef {
    pub id: i32,
    pub name: String,
    pub phone: String,
}

impl From<&client::Model> for ClientRef {
    fn from(model: &client::Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            phone: model.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GarmentItemResponse {
    pub id: i32,
    pub garment_type: GarmentType,
    pub measurements: BTreeMap<String, String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<custom_order_item::Model> for GarmentItemResponse {
    fn from(model: custom_order_item::Model) -> Self {
        Self {
            id: model.id,
            garment_type: model.garment_type,
            measurements: measurements::from_json(&model.measurements),
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrderHistoryEntry {
    pub status: CustomOrderStatus,
    pub note: String,
    pub actor: String,
    pub created_at: DateTime<Utc>,
}

impl From<custom_order_history::Model> for CustomOrderHistoryEntry {
    fn from(model: custom_order_history::Model) -> Self {
        Self {
            status: model.status,
            note: model.note,
            actor: model.actor,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrderSummary {
    pub id: i32,
    pub code: String,
    pub client: Option<ClientRef>,
    pub status: CustomOrderStatus,
    pub delivery_date: Option<NaiveDate>,
    pub is_urgent: bool,
    pub total: Decimal,
    pub deposit: Decimal,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<(custom_order::Model, Option<client::Model>)> for CustomOrderSummary {
    fn from((order, client): (custom_order::Model, Option<client::Model>)) -> Self {
        Self {
            id: order.id,
            balance: order.total - order.deposit,
            code: order.code,
            client: client.as_ref().map(ClientRef::from),
            status: order.status,
            delivery_date: order.delivery_date,
            is_urgent: order.is_urgent,
            total: order.total,
            deposit: order.deposit,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrderResponse {
    pub id: i32,
    pub code: String,
    pub client: Option<ClientRef>,
    pub status: CustomOrderStatus,
    pub delivery_date: Option<NaiveDate>,
    pub is_urgent: bool,
    pub total: Decimal,
    pub deposit: Decimal,
    pub balance: Decimal,
    pub notes: Option<String>,
    /// Garment of the first item, shown in listings and headers.
    pub garment_type: Option<GarmentType>,
    pub measurements: BTreeMap<String, String>,
    pub items: Vec<GarmentItemResponse>,
    pub history: Vec<CustomOrderHistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomOrderDetail> for CustomOrderResponse {
    fn from(detail: CustomOrderDetail) -> Self {
        let (garment_type, measurements) = match detail.garment_summary() {
            Some((garment, values)) => (Some(garment), values),
            None => (None, BTreeMap::new()),
        };
        let order = detail.order;
        Self {
            id: order.id,
            code: order.code,
            client: detail.client.as_ref().map(ClientRef::from),
            status: order.status,
            delivery_date: order.delivery_date,
            is_urgent: order.is_urgent,
            balance: order.total - order.deposit,
            total: order.total,
            deposit: order.deposit,
            notes: order.notes,
            garment_type,
            measurements,
            items: detail.items.into_iter().map(Into::into).collect(),
            history: detail.history.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
    pub phone: String,
    /// Last measurements per garment type.
    #[schema(value_type = Object)]
    pub measurements: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<client::Model> for ClientResponse {
    fn from(model: client::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone: model.phone,
            measurements: model.measurements,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientDetailResponse {
    pub client: ClientResponse,
    pub orders: Vec<CustomOrderSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeasurementsResponse {
    pub client_id: i32,
    pub garment_type: String,
    pub measurements: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CustomOrderListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub per_page: Option<u64>,
    /// Workshop stage, e.g. `corte`.
    pub status: Option<String>,
    #[serde(default)]
    pub urgent: bool,
    /// Part of the code, client name, or phone.
    pub search: Option<String>,
}

fn default_page() -> u64 {
    1
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ClientListQuery {
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/custom-orders",
    summary = "List custom orders",
    description = "Urgent orders first, then by delivery date",
    params(CustomOrderListQuery),
    responses(
        (status = 200, description = "Custom orders retrieved", body = ApiResponse<PaginatedResponse<CustomOrderSummary>>),
        (status = 400, description = "Unknown status", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn list_custom_orders(
    State(state): State<AppState>,
    Query(query): Query<CustomOrderListQuery>,
) -> ApiResult<PaginatedResponse<CustomOrderSummary>> {
    let status = non_empty(query.status)
        .map(|raw| parse_status(&raw))
        .transpose()?;
    let filter = CustomOrderFilter {
        status,
        urgent_only: query.urgent,
        search: non_empty(query.search),
    };
    let result = state
        .services
        .custom_orders
        .list(filter, query.page, query.per_page.unwrap_or(20))
        .await?;
    ok(result.map(CustomOrderSummary::from).into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/custom-orders",
    summary = "Create custom order",
    description = "Registers the client by phone if new and creates the order with at least one garment",
    request_body = NewCustomOrder,
    responses(
        (status = 201, description = "Custom order created", body = ApiResponse<CustomOrderResponse>),
        (status = 400, description = "Invalid request or unknown garment", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn create_custom_order(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<NewCustomOrder>,
) -> Created<CustomOrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .custom_orders
        .create(payload, &auth_user.actor())
        .await?;
    created(detail.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/custom-orders/{id}",
    summary = "Get custom order",
    params(("id" = i32, Path, description = "Custom order id")),
    responses(
        (status = 200, description = "Custom order retrieved", body = ApiResponse<CustomOrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn get_custom_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<CustomOrderResponse> {
    ok(state.services.custom_orders.get(id).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/custom-orders/{id}",
    summary = "Update custom order",
    description = "Partial update; the history entry lists what changed",
    params(("id" = i32, Path, description = "Custom order id")),
    request_body = UpdateCustomOrder,
    responses(
        (status = 200, description = "Custom order updated", body = ApiResponse<CustomOrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn update_custom_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateCustomOrder>,
) -> ApiResult<CustomOrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .custom_orders
        .update(id, payload, &auth_user.actor())
        .await?;
    ok(detail.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/custom-orders/{id}",
    summary = "Delete custom order",
    params(("id" = i32, Path, description = "Custom order id")),
    responses(
        (status = 200, description = "Custom order deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn delete_custom_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .custom_orders
        .delete(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/custom-orders/{id}/status",
    summary = "Change workshop stage",
    params(("id" = i32, Path, description = "Custom order id")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<CustomOrderResponse>),
        (status = 400, description = "Unknown or retired status", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn update_custom_order_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<StatusChangeRequest>,
) -> ApiResult<CustomOrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .custom_orders
        .update_status(id, &payload.status, payload.note, &auth_user.actor())
        .await?;
    ok(detail.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/custom-orders/{id}/items",
    summary = "Add garment",
    params(("id" = i32, Path, description = "Custom order id")),
    request_body = GarmentItemInput,
    responses(
        (status = 201, description = "Garment added", body = ApiResponse<CustomOrderResponse>),
        (status = 400, description = "Unknown garment", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<GarmentItemInput>,
) -> Created<CustomOrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .custom_orders
        .add_item(id, payload, &auth_user.actor())
        .await?;
    created(detail.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/custom-orders/{id}/items/{item_id}",
    summary = "Edit garment",
    description = "The history entry lists changed measurements",
    params(
        ("id" = i32, Path, description = "Custom order id"),
        ("item_id" = i32, Path, description = "Garment item id")
    ),
    request_body = GarmentItemInput,
    responses(
        (status = 200, description = "Garment updated", body = ApiResponse<CustomOrderResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn edit_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
    auth_user: AuthUser,
    Json(payload): Json<GarmentItemInput>,
) -> ApiResult<CustomOrderResponse> {
    validate_input(&payload)?;
    let detail = state
        .services
        .custom_orders
        .edit_item(id, item_id, payload, &auth_user.actor())
        .await?;
    ok(detail.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/custom-orders/{id}/items/{item_id}",
    summary = "Remove garment",
    description = "An order keeps at least one garment",
    params(
        ("id" = i32, Path, description = "Custom order id"),
        ("item_id" = i32, Path, description = "Garment item id")
    ),
    responses(
        (status = 200, description = "Garment removed", body = ApiResponse<CustomOrderResponse>),
        (status = 400, description = "Last garment of the order", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i32, i32)>,
    auth_user: AuthUser,
) -> ApiResult<CustomOrderResponse> {
    let detail = state
        .services
        .custom_orders
        .delete_item(id, item_id, &auth_user.actor())
        .await?;
    ok(detail.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/clients",
    summary = "List clients",
    params(PaginationParams, ClientListQuery),
    responses(
        (status = 200, description = "Clients retrieved", body = ApiResponse<PaginatedResponse<ClientResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
    Query(query): Query<ClientListQuery>,
) -> ApiResult<PaginatedResponse<ClientResponse>> {
    let result = state
        .services
        .custom_orders
        .list_clients(
            non_empty(query.search),
            pagination.page,
            pagination.per_page.unwrap_or(20),
        )
        .await?;
    ok(result.map(ClientResponse::from).into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/clients/{id}",
    summary = "Get client",
    description = "Client with their custom orders, newest first",
    params(("id" = i32, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client retrieved", body = ApiResponse<ClientDetailResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ClientDetailResponse> {
    let (client, orders) = state.services.custom_orders.get_client(id).await?;
    let orders = orders
        .into_iter()
        .map(|order| CustomOrderSummary::from((order, Some(client.clone()))))
        .collect();
    ok(ClientDetailResponse {
        client: client.into(),
        orders,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/clients/{id}/measurements/{garment}",
    summary = "Last measurements for a garment",
    description = "Used to prefill a new garment for a returning client",
    params(
        ("id" = i32, Path, description = "Client id"),
        ("garment" = String, Path, description = "Garment type, e.g. pollera")
    ),
    responses(
        (status = 200, description = "Measurements retrieved", body = ApiResponse<MeasurementsResponse>),
        (status = 400, description = "Unknown garment", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "custom-orders"
)]
pub async fn client_measurements(
    State(state): State<AppState>,
    Path((id, garment)): Path<(i32, String)>,
) -> Result<Json<ApiResponse<MeasurementsResponse>>, ServiceError> {
    let values = state
        .services
        .custom_orders
        .client_measurements(id, &garment)
        .await?;
    ok(MeasurementsResponse {
        client_id: id,
        garment_type: garment.trim().to_lowercase(),
        measurements: values,
    })
}
