use crate::{
    entities::{
        contact_info::{self, Entity as ContactInfo},
        notification::NotificationKind,
    },
    errors::ServiceError,
    services::{notifications, settings::non_blank, Actor},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_WHATSAPP: &str = "59170000000";
pub const DEFAULT_CITY: &str = "Sucre, Bolivia";

/// Partial update; an empty string clears a field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateContactInfo {
    #[validate(length(max = 20))]
    pub whatsapp: Option<String>,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 120))]
    pub email: Option<String>,
    #[validate(length(max = 255))]
    pub tiktok: Option<String>,
    #[validate(length(max = 255))]
    pub facebook: Option<String>,
    #[validate(length(max = 255))]
    pub instagram: Option<String>,
    #[validate(length(max = 255))]
    pub youtube: Option<String>,
    #[validate(length(max = 255))]
    pub telegram: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 120))]
    pub city: Option<String>,
    #[validate(length(max = 255))]
    pub schedule: Option<String>,
    pub map_embed: Option<String>,
}

pub async fn load_or_create<C: ConnectionTrait>(
    conn: &C,
) -> Result<contact_info::Model, ServiceError> {
    if let Some(existing) = ContactInfo::find()
        .order_by_asc(contact_info::Column::Id)
        .one(conn)
        .await?
    {
        return Ok(existing);
    }
    let created = contact_info::ActiveModel {
        whatsapp: Set(Some(DEFAULT_WHATSAPP.to_string())),
        city: Set(Some(DEFAULT_CITY.to_string())),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    info!("Default contact info created");
    Ok(created)
}

/// Digits only, as `wa.me` expects.
pub fn whatsapp_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[derive(Clone)]
pub struct ContactService {
    db: Arc<DatabaseConnection>,
}

impl ContactService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn get(&self) -> Result<contact_info::Model, ServiceError> {
        load_or_create(&*self.db).await
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        input: UpdateContactInfo,
        actor: &Actor,
    ) -> Result<contact_info::Model, ServiceError> {
        input.validate()?;
        let current = load_or_create(&*self.db).await?;
        let mut active: contact_info::ActiveModel = current.into();

        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = input.$field {
                    active.$field = Set(non_blank(value));
                })*
            };
        }
        apply!(
            phone, email, tiktok, facebook, instagram, youtube, telegram, address, city, schedule,
            map_embed,
        );
        if let Some(whatsapp) = input.whatsapp {
            let digits = whatsapp_digits(&whatsapp);
            active.whatsapp = Set((!digits.is_empty()).then_some(digits));
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        notifications::record(
            &*self.db,
            "Informacion de contacto actualizada",
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(actor = %actor.name, "Contact info updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whatsapp_numbers_are_reduced_to_digits() {
        assert_eq!(whatsapp_digits("+591 700-00000"), "59170000000");
        assert_eq!(whatsapp_digits("n/a"), "");
    }
}
