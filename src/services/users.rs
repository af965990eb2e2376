use crate::{
    auth::password::hash_password,
    entities::{
        notification::NotificationKind,
        user::{self, Entity as User},
    },
    errors::ServiceError,
    services::{notifications, settings::non_blank, Actor},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewUser {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[serde(default)]
    pub is_superadmin: bool,
}

/// Absent fields are left unchanged; a password is only replaced when given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 64))]
    pub username: Option<String>,
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    pub is_superadmin: Option<bool>,
}

/// What a signed-in user may change about themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 6, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 255))]
    pub profile_image: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(User::find()
            .order_by_asc(user::Column::Username)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<user::Model, ServiceError> {
        User::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, ServiceError> {
        Ok(User::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(&*self.db)
            .await?)
    }

    #[instrument(skip(self, input, actor), fields(username = %input.username))]
    pub async fn create(&self, input: NewUser, actor: &Actor) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let username = input.username.trim().to_string();
        self.ensure_username_free(&username, None).await?;

        let created = user::ActiveModel {
            username: Set(username),
            name: Set(input.name.and_then(non_blank)),
            password_hash: Set(hash_password(&input.password)?),
            is_superadmin: Set(input.is_superadmin),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        notifications::record(
            &*self.db,
            format!("Usuario '{}' creado", created.username),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(user_id = created.id, superadmin = created.is_superadmin, "User created");
        Ok(created)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: i32,
        input: UpdateUser,
        actor: &Actor,
    ) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        if actor.id == Some(id) && input.is_superadmin == Some(false) && existing.is_superadmin {
            return Err(ServiceError::InvalidOperation(
                "You cannot remove your own superadmin role".to_string(),
            ));
        }

        let mut active: user::ActiveModel = existing.into();
        if let Some(username) = input.username.map(|u| u.trim().to_string()) {
            self.ensure_username_free(&username, Some(id)).await?;
            active.username = Set(username);
        }
        if let Some(name) = input.name {
            active.name = Set(non_blank(name));
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(superadmin) = input.is_superadmin {
            active.is_superadmin = Set(superadmin);
        }
        let updated = active.update(&*self.db).await?;

        notifications::record(
            &*self.db,
            format!("Usuario '{}' actualizado", updated.username),
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        Ok(updated)
    }

    /// Users cannot delete themselves.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        if actor.id == Some(id) {
            return Err(ServiceError::InvalidOperation(
                "You cannot delete your own account".to_string(),
            ));
        }
        let existing = self.get(id).await?;
        User::delete_by_id(id).exec(&*self.db).await?;
        notifications::record(
            &*self.db,
            format!("Usuario '{}' eliminado", existing.username),
            NotificationKind::Danger,
            Some(actor.name.as_str()),
        )
        .await?;
        warn!(user_id = id, actor = %actor.name, "User deleted");
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        id: i32,
        input: UpdateProfile,
    ) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(non_blank(name));
        }
        if let Some(password) = input.password {
            active.password_hash = Set(hash_password(&password)?);
        }
        if let Some(image) = input.profile_image {
            active.profile_image = Set(non_blank(image));
        }
        Ok(active.update(&*self.db).await?)
    }

    pub async fn count(&self) -> Result<u64, ServiceError> {
        Ok(User::find().count(&*self.db).await?)
    }

    async fn ensure_username_free(
        &self,
        username: &str,
        except: Option<i32>,
    ) -> Result<(), ServiceError> {
        let mut query = User::find().filter(user::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "Username '{}' is already taken",
                username
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn self_delete_is_refused_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let service = UserService::new(Arc::new(db));
        let err = service
            .delete(3, &Actor::user(3, "pathy"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));
    }

    #[test]
    fn short_passwords_fail_validation() {
        let input = NewUser {
            username: "ana".into(),
            name: None,
            password: "12345".into(),
            is_superadmin: false,
        };
        assert!(input.validate().is_err());
    }
}
