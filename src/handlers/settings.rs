//! Site-wide singletons: contact details and storefront settings.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::AuthUser,
    entities::{contact_info, site_settings},
    handlers::common::{ok, validate_input, ApiResult},
    services::{contact::UpdateContactInfo, settings::UpdateSiteSettings},
    ApiResponse, AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub whatsapp: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tiktok: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub telegram: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub schedule: Option<String>,
    pub map_embed: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<contact_info::Model> for ContactResponse {
    fn from(model: contact_info::Model) -> Self {
        Self {
            whatsapp: model.whatsapp,
            phone: model.phone,
            email: model.email,
            tiktok: model.tiktok,
            facebook: model.facebook,
            instagram: model.instagram,
            youtube: model.youtube,
            telegram: model.telegram,
            address: model.address,
            city: model.city,
            schedule: model.schedule,
            map_embed: model.map_embed,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub site_name: String,
    pub tagline: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
    pub meta_description: Option<String>,
    pub meta_keywords: Option<String>,
    pub show_prices: bool,
    pub maintenance_mode: bool,
    pub exchange_rate: Option<Decimal>,
    pub qr_image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<site_settings::Model> for SettingsResponse {
    fn from(model: site_settings::Model) -> Self {
        Self {
            site_name: model.site_name,
            tagline: model.tagline,
            logo: model.logo,
            favicon: model.favicon,
            meta_description: model.meta_description,
            meta_keywords: model.meta_keywords,
            show_prices: model.show_prices,
            maintenance_mode: model.maintenance_mode,
            exchange_rate: model.exchange_rate,
            qr_image: model.qr_image,
            updated_at: model.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/contact",
    summary = "Contact details",
    responses((status = 200, description = "Contact details", body = ApiResponse<ContactResponse>)),
    tag = "settings"
)]
pub async fn get_contact(State(state): State<AppState>) -> ApiResult<ContactResponse> {
    ok(state.services.contact.get().await?.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/contact",
    summary = "Update contact details",
    description = "Absent fields are kept; an empty string clears a field",
    request_body = UpdateContactInfo,
    responses(
        (status = 200, description = "Contact details updated", body = ApiResponse<ContactResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateContactInfo>,
) -> ApiResult<ContactResponse> {
    validate_input(&payload)?;
    let contact = state
        .services
        .contact
        .update(payload, &auth_user.actor())
        .await?;
    ok(contact.into())
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    summary = "Site settings",
    responses((status = 200, description = "Site settings", body = ApiResponse<SettingsResponse>)),
    tag = "settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsResponse> {
    ok(state.services.settings.get().await?.into())
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings",
    summary = "Update site settings",
    description = "Absent fields are kept. The exchange rate must be positive.",
    request_body = UpdateSiteSettings,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<SettingsResponse>),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<UpdateSiteSettings>,
) -> ApiResult<SettingsResponse> {
    validate_input(&payload)?;
    let settings = state
        .services
        .settings
        .update(payload, &auth_user.actor())
        .await?;
    ok(settings.into())
}
