use crate::{
    entities::{
        notification::NotificationKind,
        theme::{self, Entity as Theme},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{notifications, Actor},
};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

lazy_static! {
    static ref HEX_COLOR: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}){1,2}$").expect("hex colour pattern compiles");
}

fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("must be a #RGB or #RRGGBB colour".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ThemeInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(custom = "validate_hex_color")]
    pub primary_color: String,
    #[validate(custom = "validate_hex_color")]
    pub secondary_color: String,
    #[validate(custom = "validate_hex_color")]
    pub accent_color: String,
    #[validate(custom = "validate_hex_color")]
    pub text_color: String,
    #[validate(custom = "validate_hex_color")]
    pub bg_color: String,
    #[validate(custom = "validate_hex_color")]
    pub success_color: String,
    #[validate(custom = "validate_hex_color")]
    pub error_color: String,
    #[serde(default)]
    pub is_default: bool,
}

impl ThemeInput {
    /// Stock palette with the given name.
    pub fn palette(name: &str, colors: [&str; 7], is_default: bool) -> Self {
        let [primary, secondary, accent, text, bg, success, error] = colors;
        Self {
            name: name.to_string(),
            primary_color: primary.to_string(),
            secondary_color: secondary.to_string(),
            accent_color: accent.to_string(),
            text_color: text.to_string(),
            bg_color: bg.to_string(),
            success_color: success.to_string(),
            error_color: error.to_string(),
            is_default,
        }
    }
}

/// Clears the default flag everywhere, then sets it on `id`.
async fn make_exclusive_default<C: ConnectionTrait>(conn: &C, id: i32) -> Result<(), ServiceError> {
    Theme::update_many()
        .col_expr(theme::Column::IsDefault, Expr::value(false))
        .exec(conn)
        .await?;
    Theme::update_many()
        .col_expr(theme::Column::IsDefault, Expr::value(true))
        .filter(theme::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct ThemeService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl ThemeService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self { db, event_sender }
    }

    pub async fn list(&self) -> Result<Vec<theme::Model>, ServiceError> {
        Ok(Theme::find()
            .order_by_desc(theme::Column::IsDefault)
            .order_by_asc(theme::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<theme::Model, ServiceError> {
        Theme::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Theme {} not found", id)))
    }

    /// The default theme, or the oldest one when none is flagged.
    pub async fn active(&self) -> Result<theme::Model, ServiceError> {
        if let Some(theme) = Theme::find()
            .filter(theme::Column::IsDefault.eq(true))
            .one(&*self.db)
            .await?
        {
            return Ok(theme);
        }
        Theme::find()
            .order_by_asc(theme::Column::Id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No theme configured".to_string()))
    }

    #[instrument(skip(self, input, actor), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: ThemeInput,
        actor: &Actor,
    ) -> Result<theme::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let txn = self.db.begin().await?;
        let first = Theme::find().count(&txn).await? == 0;
        let created = theme::ActiveModel {
            name: Set(name),
            primary_color: Set(input.primary_color),
            secondary_color: Set(input.secondary_color),
            accent_color: Set(input.accent_color),
            text_color: Set(input.text_color),
            bg_color: Set(input.bg_color),
            success_color: Set(input.success_color),
            error_color: Set(input.error_color),
            is_default: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        if input.is_default || first {
            make_exclusive_default(&txn, created.id).await?;
        }
        notifications::record(
            &txn,
            format!("Tema '{}' creado", created.name),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        info!(theme_id = created.id, "Theme created");
        self.get(created.id).await
    }

    /// Updates colours and name. Setting `is_default` makes this theme the
    /// only default; clearing it on the current default is ignored.
    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: i32,
        input: ThemeInput,
        actor: &Actor,
    ) -> Result<theme::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, Some(id)).await?;

        let txn = self.db.begin().await?;
        let mut active: theme::ActiveModel = existing.into();
        active.name = Set(name);
        active.primary_color = Set(input.primary_color);
        active.secondary_color = Set(input.secondary_color);
        active.accent_color = Set(input.accent_color);
        active.text_color = Set(input.text_color);
        active.bg_color = Set(input.bg_color);
        active.success_color = Set(input.success_color);
        active.error_color = Set(input.error_color);
        let updated = active.update(&txn).await?;
        if input.is_default && !updated.is_default {
            make_exclusive_default(&txn, id).await?;
        }
        notifications::record(
            &txn,
            format!("Tema '{}' actualizado", updated.name),
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;
        self.get(id).await
    }

    /// The default theme cannot be deleted.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        if existing.is_default {
            return Err(ServiceError::Conflict(
                "The active theme cannot be deleted".to_string(),
            ));
        }
        Theme::delete_by_id(id).exec(&*self.db).await?;
        notifications::record(
            &*self.db,
            format!("Tema '{}' eliminado", existing.name),
            NotificationKind::Warning,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(theme_id = id, "Theme deleted");
        Ok(())
    }

    /// Makes `id` the single default theme.
    #[instrument(skip(self, actor))]
    pub async fn activate(&self, id: i32, actor: &Actor) -> Result<theme::Model, ServiceError> {
        let target = self.get(id).await?;
        let txn = self.db.begin().await?;
        make_exclusive_default(&txn, id).await?;
        notifications::record(
            &txn,
            format!("Tema '{}' activado", target.name),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        info!(theme_id = id, actor = %actor.name, "Theme activated");
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ThemeActivated(id)).await {
                warn!(error = %e, "Failed to publish theme event");
            }
        }
        self.get(id).await
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> Result<(), ServiceError> {
        let mut query = Theme::find().filter(theme::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(theme::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "A theme named '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#fff", true)]
    #[case("#8F2D56", true)]
    #[case("#8F2D5", false)]
    #[case("8F2D56", false)]
    #[case("#GGGGGG", false)]
    fn hex_colours(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(validate_hex_color(value).is_ok(), ok);
    }

    #[test]
    fn palette_rejects_bad_colours() {
        let mut input = ThemeInput::palette(
            "Prueba",
            ["#000", "#111", "#222", "#333", "#444", "#555", "#666"],
            false,
        );
        assert!(input.validate().is_ok());
        input.bg_color = "blue".into();
        assert!(input.validate().is_err());
    }
}
