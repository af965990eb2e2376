use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    entities::theme,
    handlers::common::{created, ok, validate_input, ApiResult, Created, DeletedResponse},
    services::themes::ThemeInput,
    ApiResponse, AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ThemeResponse {
    pub id: i32,
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub text_color: String,
    pub bg_color: String,
    pub success_color: String,
    pub error_color: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<theme::Model> for ThemeResponse {
    fn from(model: theme::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            primary_color: model.primary_color,
            secondary_color: model.secondary_color,
            accent_color: model.accent_color,
            text_color: model.text_color,
            bg_color: model.bg_color,
            success_color: model.success_color,
            error_color: model.error_color,
            is_default: model.is_default,
            created_at: model.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/theme",
    summary = "Active theme",
    description = "The default theme, or the oldest one when none is flagged",
    responses(
        (status = 200, description = "Theme retrieved", body = ApiResponse<ThemeResponse>),
        (status = 404, description = "No theme configured", body = crate::errors::ErrorResponse)
    ),
    tag = "themes"
)]
pub async fn active_theme(State(state): State<AppState>) -> ApiResult<ThemeResponse> {
    ok(state.services.themes.active().await?.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/themes",
    summary = "List themes",
    responses(
        (status = 200, description = "Themes retrieved", body = ApiResponse<Vec<ThemeResponse>>),
        (status = 403, description = "Superadmin only", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn list_themes(State(state): State<AppState>) -> ApiResult<Vec<ThemeResponse>> {
    let themes = state.services.themes.list().await?;
    ok(themes.into_iter().map(Into::into).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/themes/{id}",
    summary = "Get theme",
    params(("id" = i32, Path, description = "Theme id")),
    responses(
        (status = 200, description = "Theme retrieved", body = ApiResponse<ThemeResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn get_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<ThemeResponse> {
    ok(state.services.themes.get(id).await?.into())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/themes",
    summary = "Create theme",
    description = "Colours must be #RGB or #RRGGBB. `is_default` makes it the only default.",
    request_body = ThemeInput,
    responses(
        (status = 201, description = "Theme created", body = ApiResponse<ThemeResponse>),
        (status = 400, description = "Invalid colour", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn create_theme(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ThemeInput>,
) -> Created<ThemeResponse> {
    validate_input(&payload)?;
    let theme = state
        .services
        .themes
        .create(payload, &auth_user.actor())
        .await?;
    created(theme.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/themes/{id}",
    summary = "Update theme",
    params(("id" = i32, Path, description = "Theme id")),
    request_body = ThemeInput,
    responses(
        (status = 200, description = "Theme updated", body = ApiResponse<ThemeResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn update_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
    Json(payload): Json<ThemeInput>,
) -> ApiResult<ThemeResponse> {
    validate_input(&payload)?;
    let theme = state
        .services
        .themes
        .update(id, payload, &auth_user.actor())
        .await?;
    ok(theme.into())
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/themes/{id}",
    summary = "Delete theme",
    params(("id" = i32, Path, description = "Theme id")),
    responses(
        (status = 200, description = "Theme deleted", body = ApiResponse<DeletedResponse>),
        (status = 409, description = "The default theme cannot be deleted", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn delete_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<DeletedResponse> {
    state
        .services
        .themes
        .delete(id, &auth_user.actor())
        .await?;
    ok(DeletedResponse::new(id))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/themes/{id}/activate",
    summary = "Activate theme",
    description = "Makes the theme the single default",
    params(("id" = i32, Path, description = "Theme id")),
    responses(
        (status = 200, description = "Theme activated", body = ApiResponse<ThemeResponse>),
        (status = 404, description = "Not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "themes"
)]
pub async fn activate_theme(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    auth_user: AuthUser,
) -> ApiResult<ThemeResponse> {
    let theme = state
        .services
        .themes
        .activate(id, &auth_user.actor())
        .await?;
    ok(theme.into())
}
