use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    handlers::{
        common::{non_empty, ok, ApiResult},
        products::{CategoryResponse, ProductResponse},
    },
    services::{
        catalog::{CatalogQuery, CatalogSort},
        products::ProductWithImages,
    },
    ApiResponse, AppState, PaginatedResponse,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CatalogParams {
    #[serde(default = "default_page")]
    pub page: u64,
    /// Defaults to 12, at most 60.
    pub per_page: Option<u64>,
    /// Matches name or description.
    pub q: Option<String>,
    pub category_id: Option<i32>,
    /// `recientes` (default), `antiguos`, `precio_asc`, `precio_desc`,
    /// `nombre_asc`, `nombre_desc` or `populares`.
    pub sort: Option<String>,
}

fn default_page() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDetailResponse {
    pub product: ProductResponse,
    pub related: Vec<ProductResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HomeResponse {
    pub new_arrivals: Vec<ProductResponse>,
    pub trending: Vec<ProductResponse>,
    pub featured: Vec<ProductResponse>,
    pub latest: Vec<ProductResponse>,
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/products",
    operation_id = "catalog_list_products",
    summary = "Browse catalog",
    description = "Active products only. Unknown sort values fall back to newest first.",
    params(CatalogParams),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<PaginatedResponse<ProductResponse>>),
        (status = 503, description = "Shop in maintenance", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<CatalogParams>,
) -> ApiResult<PaginatedResponse<ProductResponse>> {
    let query = CatalogQuery {
        page: params.page,
        per_page: params.per_page,
        search: non_empty(params.q),
        category_id: params.category_id,
        sort: CatalogSort::parse_lenient(params.sort.as_deref()),
    };
    let result = state.services.catalog.list(query).await?;
    ok(result.map(ProductResponse::from).into())
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/products/{id}",
    operation_id = "catalog_get_product",
    summary = "Product page",
    description = "Counts a view and returns up to four related products from the same category",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product retrieved", body = ApiResponse<ProductDetailResponse>),
        (status = 404, description = "Unknown or inactive product", body = crate::errors::ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ProductDetailResponse> {
    let (product, related) = state.services.catalog.product_detail(id).await?;
    ok(ProductDetailResponse {
        product: product.into(),
        related: related.into_iter().map(Into::into).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/home",
    summary = "Home page sections",
    description = "New, trending and featured products (shuffled, up to eight each) plus the twelve newest",
    responses(
        (status = 200, description = "Sections retrieved", body = ApiResponse<HomeResponse>)
    ),
    tag = "catalog"
)]
pub async fn home(State(state): State<AppState>) -> ApiResult<HomeResponse> {
    let sections = state.services.catalog.home().await?;
    let convert = |items: Vec<ProductWithImages>| -> Vec<ProductResponse> {
        items.into_iter().map(ProductResponse::from).collect()
    };
    ok(HomeResponse {
        new_arrivals: convert(sections.new_arrivals),
        trending: convert(sections.trending),
        featured: convert(sections.featured),
        latest: convert(sections.latest),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/catalog/categories",
    operation_id = "catalog_list_categories",
    summary = "Active categories",
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<CategoryResponse>>)
    ),
    tag = "catalog"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryResponse>> {
    let categories = state.services.categories.list_active().await?;
    ok(categories.into_iter().map(Into::into).collect())
}
