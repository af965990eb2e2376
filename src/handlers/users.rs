use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    entities::user,
    handlers::common::{created, ok, validate_input, ApiResult, Created, DeletedResponse},
    services::users::{NewUser, UpdateUser},
    ApiResponse, AppState,
};

/// Account as shown to administrators. The password hash never leaves the
/// service layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub name: Option<String>,
    pub is_superadmin: bool,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            name: model.name,
            is_superadmin: model.is_superadmin,
            profile_image: model.profile_image,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    summary = "List users",
    responses(
        (status = 200, description = "Users retrieved", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Superadmin only", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserResponse>> {
    let users = state.services.users.list().await?;
    ok(users.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    summary = "Get user",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User retrieved", body = ApiResponse<UserResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<UserResponse> {
    ok(state.services.users.get(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    summary = "Create user",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<NewUser>,
) -> Created<UserResponse> {
    validate_input(&payload)?;
    let user = state
        .services
        .users
        .create(payload, &auth_user.actor())
        .await?;
    created(user.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    summary = "Update user",
    description = "Absent fields are kept; a password is only replaced when given",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username taken", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<UserResponse> {
    validate_input(&payload)?;
    let user = state
        .services
        .users
        .update(id, payload, &auth_user.actor())
        .await?;
    ok(user.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    summary = "Delete user",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<DeletedResponse>),
        (status = 400, description = "Users cannot delete themselves", body = crate::errors::ErrorResponse),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .users
        .delete(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}
