//! Back-office catalog management: products, their images, and categories.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::AuthUser,
    entities::{category, product_image},
    handlers::common::{
        created, non_empty, ok, validate_input, ApiResult, Created, DeletedResponse,
    },
    services::{
        categories::CategoryInput,
        products::{AdminProductFilter, ImageUpload, ProductInput, ProductWithImages},
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Public path prefix for uploaded files.
pub const UPLOADS_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageResponse {
    pub id: i32,
    pub filename: String,
    pub url: String,
    pub is_main: bool,
    pub sort_order: i32,
}

impl From<product_image::Model> for ImageResponse {
    fn from(model: product_image::Model) -> Self {
        Self {
            url: format!("{}/{}", UPLOADS_PREFIX, model.filename),
            id: model.id,
            filename: model.filename,
            is_main: model.is_main,
            sort_order: model.sort_order,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryRef {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub has_discount: bool,
    pub discount_percent: i64,
    pub stock: i32,
    pub sku: Option<String>,
    pub category: Option<CategoryRef>,
    pub is_active: bool,
    pub is_new: bool,
    pub is_trending: bool,
    pub is_featured: bool,
    pub views: i32,
    pub main_image: Option<String>,
    pub images: Vec<ImageResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductWithImages> for ProductResponse {
    fn from(item: ProductWithImages) -> Self {
        let main_image = item
            .main_image()
            .map(|img| format!("{}/{}", UPLOADS_PREFIX, img.filename));
        let has_discount = item.product.has_discount();
        let discount_percent = item.product.discount_percent();
        let product = item.product;
        Self {
            id: product.id,
            name: product.name,
            slug: product.slug,
            description: product.description,
            price: product.price,
            original_price: product.original_price,
            has_discount,
            discount_percent,
            stock: product.stock,
            sku: product.sku,
            category: item.category.map(|c| CategoryRef {
                id: c.id,
                name: c.name,
                slug: c.slug,
            }),
            is_active: product.is_active,
            is_new: product.is_new,
            is_trending: product.is_trending,
            is_featured: product.is_featured,
            views: product.views,
            main_image,
            images: item.images.into_iter().map(Into::into).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
    /// Only filled in the admin listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_count: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            icon: model.icon,
            sort_order: model.sort_order,
            is_active: model.is_active,
            product_count: None,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminProductQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    /// Defaults to 15.
    pub per_page: Option<u64>,
    /// Part of the product name.
    pub search: Option<String>,
    pub category_id: Option<i32>,
}

fn default_page() -> u64 {
    1
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products",
    summary = "List products",
    description = "All products, active or not, newest first",
    params(AdminProductQuery),
    responses(
        (status = 200, description = "Products retrieved", body = ApiResponse<PaginatedResponse<ProductResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<AdminProductQuery>,
) -> ApiResult<PaginatedResponse<ProductResponse>> {
    let filter = AdminProductFilter {
        search: non_empty(query.search),
        category_id: query.category_id,
    };
    let result = state
        .services
        .products
        .list(filter, query.page, query.per_page)
        .await?;
    ok(result.map(ProductResponse::from).into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/products/{id}",
    summary = "Get product",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product retrieved", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ProductResponse> {
    ok(state.services.products.get(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/products",
    summary = "Create product",
    request_body = ProductInput,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown category", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ProductInput>,
) -> Created<ProductResponse> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .create(payload, &auth_user.actor())
        .await?;
    created(product.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/products/{id}",
    summary = "Update product",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<ProductInput>,
) -> ApiResult<ProductResponse> {
    validate_input(&payload)?;
    let product = state
        .services
        .products
        .update(id, payload, &auth_user.actor())
        .await?;
    ok(product.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}",
    summary = "Delete product",
    description = "Refused while orders reference the product. Image files are removed best-effort.",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Product has orders", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .products
        .delete(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/products/{id}/images",
    summary = "Upload product image",
    description = "Base64 payload or data URL; png, jpg, jpeg, gif or webp",
    params(("id" = i32, Path, description = "Product id")),
    request_body = ImageUpload,
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<ProductResponse>),
        (status = 400, description = "Unsupported file or payload too large", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn add_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ImageUpload>,
) -> Created<ProductResponse> {
    validate_input(&payload)?;
    let product = state.services.products.add_image(id, payload).await?;
    created(product.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/products/{id}/images/{image_id}/main",
    summary = "Set main image",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("image_id" = i32, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Main image set", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn set_main_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> ApiResult<ProductResponse> {
    ok(state
        .services
        .products
        .set_main_image(id, image_id)
        .await?
        .into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/products/{id}/images/{image_id}",
    summary = "Delete product image",
    description = "Deleting the main image promotes the next one",
    params(
        ("id" = i32, Path, description = "Product id"),
        ("image_id" = i32, Path, description = "Image id")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<ProductResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "products"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((id, image_id)): Path<(i32, i32)>,
) -> ApiResult<ProductResponse> {
    ok(state
        .services
        .products
        .delete_image(id, image_id)
        .await?
        .into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/categories",
    summary = "List categories",
    description = "All categories with their product counts",
    responses(
        (status = 200, description = "Categories retrieved", body = ApiResponse<Vec<CategoryResponse>>)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<CategoryResponse>> {
    let categories = state.services.categories.list_all().await?;
    ok(categories
        .into_iter()
        .map(|(model, count)| CategoryResponse {
            product_count: Some(count),
            ..model.into()
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/categories/{id}",
    summary = "Get category",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category retrieved", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<CategoryResponse> {
    ok(state.services.categories.get(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/categories",
    summary = "Create category",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponse>),
        (status = 409, description = "Name already used", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CategoryInput>,
) -> Created<CategoryResponse> {
    validate_input(&payload)?;
    let category = state
        .services
        .categories
        .create(payload, &auth_user.actor())
        .await?;
    created(category.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/categories/{id}",
    summary = "Update category",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<CategoryInput>,
) -> ApiResult<CategoryResponse> {
    validate_input(&payload)?;
    let category = state
        .services
        .categories
        .update(id, payload, &auth_user.actor())
        .await?;
    ok(category.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/categories/{id}",
    summary = "Delete category",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeletedResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category still has products", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .categories
        .delete(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}
