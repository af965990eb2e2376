//! First-run data: stock themes, contact info, site settings, and an optional
//! bootstrap superadmin. Each step only fills an empty table.

use crate::{
    auth::password::hash_password,
    config::AppConfig,
    entities::{
        theme::{self, Entity as Theme},
        user::{self, Entity as User},
    },
    errors::ServiceError,
    services::{contact, settings, themes::ThemeInput},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::{info, instrument};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// `(name, [primary, secondary, accent, text, bg, success, error], default)`
pub const STOCK_THEMES: [(&str, [&str; 7], bool); 5] = [
    (
        "Elegante",
        ["#8F2D56", "#E36485", "#25D366", "#333333", "#F8F9FA", "#2A9D8F", "#E63946"],
        true,
    ),
    (
        "Oscuro",
        ["#1a1a2e", "#16213e", "#e94560", "#eaeaea", "#1a1a2e", "#00b894", "#ff6b6b"],
        false,
    ),
    (
        "Moderno",
        ["#667eea", "#764ba2", "#f093fb", "#2d3436", "#ffffff", "#00cec9", "#ff7675"],
        false,
    ),
    (
        "Natural",
        ["#2d5a27", "#4a7c59", "#a8d8b9", "#1e3d19", "#f5f5dc", "#27ae60", "#e74c3c"],
        false,
    ),
    (
        "Coral",
        ["#ff6b6b", "#ee5a5a", "#feca57", "#2d3436", "#fff5f5", "#1dd1a1", "#ff6b6b"],
        false,
    ),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub themes: usize,
    pub admin_created: bool,
}

#[instrument(skip_all)]
pub async fn seed_defaults(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<SeedReport, ServiceError> {
    let mut report = SeedReport {
        themes: seed_themes(db).await?,
        ..Default::default()
    };
    contact::load_or_create(db).await?;
    settings::load_or_create(db).await?;

    if let Some(password) = config
        .bootstrap_admin_password
        .as_deref()
        .filter(|p| !p.is_empty())
    {
        if User::find().count(db).await? == 0 {
            let username = config
                .bootstrap_admin_username
                .as_deref()
                .unwrap_or(DEFAULT_ADMIN_USERNAME);
            create_admin(db, username, password, true).await?;
            report.admin_created = true;
        }
    }

    info!(themes = report.themes, admin_created = report.admin_created, "Seed complete");
    Ok(report)
}

pub async fn seed_themes(db: &DatabaseConnection) -> Result<usize, ServiceError> {
    if Theme::find().count(db).await? > 0 {
        return Ok(0);
    }
    let now = Utc::now();
    for (name, colors, is_default) in STOCK_THEMES {
        let input = ThemeInput::palette(name, colors, is_default);
        theme::ActiveModel {
            name: Set(input.name),
            primary_color: Set(input.primary_color),
            secondary_color: Set(input.secondary_color),
            accent_color: Set(input.accent_color),
            text_color: Set(input.text_color),
            bg_color: Set(input.bg_color),
            success_color: Set(input.success_color),
            error_color: Set(input.error_color),
            is_default: Set(input.is_default),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(STOCK_THEMES.len())
}

/// Inserts an account directly, bypassing the notification trail. Used by
/// the seed step and the CLI.
pub async fn create_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    is_superadmin: bool,
) -> Result<user::Model, ServiceError> {
    let username = username.trim();
    if username.len() < 3 || password.len() < 6 {
        return Err(ServiceError::ValidationError(
            "username needs 3+ characters and password 6+".to_string(),
        ));
    }
    let exists = User::find()
        .filter(user::Column::Username.eq(username))
        .count(db)
        .await?;
    if exists > 0 {
        return Err(ServiceError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }
    let created = user::ActiveModel {
        username: Set(username.to_string()),
        name: Set(Some("Administrador".to_string())),
        password_hash: Set(hash_password(password)?),
        is_superadmin: Set(is_superadmin),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(user_id = created.id, %username, "Admin account created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn stock_themes_are_valid_and_have_one_default() {
        let defaults = STOCK_THEMES.iter().filter(|(_, _, d)| *d).count();
        assert_eq!(defaults, 1);
        for (name, colors, is_default) in STOCK_THEMES {
            assert!(ThemeInput::palette(name, colors, is_default).validate().is_ok(), "{name}");
        }
    }
}
