use crate::{
    entities::{
        notification::NotificationKind,
        site_settings::{self, Entity as SiteSettings},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{notifications, Actor},
};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_SITE_NAME: &str = "Modas Pathy";
pub const DEFAULT_TAGLINE: &str = "Elegancia de la cholita boliviana";

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSiteSettings {
    #[validate(length(min = 1, max = 100))]
    pub site_name: Option<String>,
    #[validate(length(max = 200))]
    pub tagline: Option<String>,
    #[validate(length(max = 255))]
    pub logo: Option<String>,
    #[validate(length(max = 255))]
    pub favicon: Option<String>,
    #[validate(length(max = 300))]
    pub meta_description: Option<String>,
    #[validate(length(max = 300))]
    pub meta_keywords: Option<String>,
    pub show_prices: Option<bool>,
    pub maintenance_mode: Option<bool>,
    /// Local currency units per settlement unit.
    pub exchange_rate: Option<Decimal>,
    #[validate(length(max = 255))]
    pub qr_image: Option<String>,
}

/// Loads the settings row, inserting defaults the first time.
pub async fn load_or_create<C: ConnectionTrait>(
    conn: &C,
) -> Result<site_settings::Model, ServiceError> {
    if let Some(existing) = SiteSettings::find()
        .order_by_asc(site_settings::Column::Id)
        .one(conn)
        .await?
    {
        return Ok(existing);
    }
    let created = site_settings::ActiveModel {
        site_name: Set(DEFAULT_SITE_NAME.to_string()),
        tagline: Set(Some(DEFAULT_TAGLINE.to_string())),
        show_prices: Set(true),
        maintenance_mode: Set(false),
        exchange_rate: Set(Some(dec!(6.96))),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!("Default site settings created");
    Ok(created)
}

#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    pub async fn get(&self) -> Result<site_settings::Model, ServiceError> {
        load_or_create(&*self.db).await
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        input: UpdateSiteSettings,
        actor: &Actor,
    ) -> Result<site_settings::Model, ServiceError> {
        input.validate()?;
        if matches!(input.exchange_rate, Some(rate) if rate <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "exchange_rate must be positive".to_string(),
            ));
        }

        let current = load_or_create(&*self.db).await?;
        let mut active: site_settings::ActiveModel = current.into();
        if let Some(site_name) = input.site_name {
            active.site_name = Set(site_name.trim().to_string());
        }
        if let Some(tagline) = input.tagline {
            active.tagline = Set(non_blank(tagline));
        }
        if let Some(logo) = input.logo {
            active.logo = Set(non_blank(logo));
        }
        if let Some(favicon) = input.favicon {
            active.favicon = Set(non_blank(favicon));
        }
        if let Some(description) = input.meta_description {
            active.meta_description = Set(non_blank(description));
        }
        if let Some(keywords) = input.meta_keywords {
            active.meta_keywords = Set(non_blank(keywords));
        }
        if let Some(show_prices) = input.show_prices {
            active.show_prices = Set(show_prices);
        }
        if let Some(maintenance) = input.maintenance_mode {
            active.maintenance_mode = Set(maintenance);
        }
        if let Some(rate) = input.exchange_rate {
            active.exchange_rate = Set(Some(rate));
        }
        if let Some(qr) = input.qr_image {
            active.qr_image = Set(non_blank(qr));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        notifications::record(
            &*self.db,
            "Configuracion del sitio actualizada",
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(actor = %actor.name, maintenance = updated.maintenance_mode, "Site settings updated");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::SettingsUpdated).await {
                warn!(error = %e, "Failed to publish settings event");
            }
        }
        Ok(updated)
    }
}

pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_clear_optional_fields() {
        assert_eq!(non_blank("   ".to_string()), None);
        assert_eq!(non_blank(" logo.png ".to_string()).as_deref(), Some("logo.png"));
    }
}
