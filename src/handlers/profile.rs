use axum::{extract::State, Json};

use crate::{
    auth::AuthUser,
    handlers::{
        common::{ok, validate_input, ApiResult},
        users::UserResponse,
    },
    services::users::UpdateProfile,
    ApiResponse, AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/profile",
    summary = "Own profile",
    responses(
        (status = 200, description = "Profile retrieved", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_profile(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<UserResponse> {
    ok(state.services.users.get(auth_user.user_id).await?.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/profile",
    summary = "Update own profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateProfile>,
) -> ApiResult<UserResponse> {
    validate_input(&payload)?;
    let user = state
        .services
        .users
        .update_profile(auth_user.user_id, payload)
        .await?;
    ok(user.into())
}
