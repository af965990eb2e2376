use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entities::{custom_order::CustomOrderStatus, order::OrderStatus},
    handlers::{
        common::{ok, ApiResult},
        notifications::NotificationResponse,
    },
    services::dashboard::DashboardStats,
    ApiResponse, AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrderStatusCount {
    pub status: CustomOrderStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub id: i32,
    pub name: String,
    pub views: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub products: u64,
    pub active_products: u64,
    pub new_products: u64,
    pub trending_products: u64,
    pub featured_products: u64,
    pub categories: u64,
    pub users: u64,
    pub orders_by_status: Vec<OrderStatusCount>,
    pub custom_orders_by_status: Vec<CustomOrderStatusCount>,
    pub urgent_custom_orders: u64,
    pub top_viewed: Vec<TopProduct>,
    pub recent_notifications: Vec<NotificationResponse>,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            products: stats.products,
            active_products: stats.active_products,
            new_products: stats.new_products,
            trending_products: stats.trending_products,
            featured_products: stats.featured_products,
            categories: stats.categories,
            users: stats.users,
            orders_by_status: stats
                .orders_by_status
                .into_iter()
                .map(|(status, count)| OrderStatusCount { status, count })
                .collect(),
            custom_orders_by_status: stats
                .custom_orders_by_status
                .into_iter()
                .map(|(status, count)| CustomOrderStatusCount { status, count })
                .collect(),
            urgent_custom_orders: stats.urgent_custom_orders,
            top_viewed: stats
                .top_viewed
                .into_iter()
                .map(|p| TopProduct {
                    id: p.id,
                    name: p.name,
                    views: p.views,
                })
                .collect(),
            recent_notifications: stats
                .recent_notifications
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dashboard",
    summary = "Back-office dashboard",
    description = "Catalog counts, orders per status, top viewed products and latest notifications",
    responses((status = 200, description = "Dashboard", body = ApiResponse<DashboardResponse>)),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardResponse> {
    ok(state.services.dashboard.stats().await?.into())
}
