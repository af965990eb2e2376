use crate::{
    entities::{
        category::{self, Entity as Category},
        notification::NotificationKind,
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    services::{notifications, settings::non_blank, slug::slugify, Actor},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_ICON: &str = "bi-tag";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Icon class; defaults to `bi-tag`.
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Every category with its product count.
    pub async fn list_all(&self) -> Result<Vec<(category::Model, u64)>, ServiceError> {
        let categories = Category::find()
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        let mut out = Vec::with_capacity(categories.len());
        for category in categories {
            let count = self.product_count(category.id).await?;
            out.push((category, count));
        }
        Ok(out)
    }

    pub async fn list_active(&self) -> Result<Vec<category::Model>, ServiceError> {
        Ok(Category::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<category::Model, ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    #[instrument(skip(self, input, actor), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: CategoryInput,
        actor: &Actor,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, None).await?;

        let created = category::ActiveModel {
            slug: Set(slugify(&name)),
            name: Set(name),
            description: Set(input.description.and_then(non_blank)),
            icon: Set(input
                .icon
                .and_then(non_blank)
                .unwrap_or_else(|| DEFAULT_ICON.to_string())),
            sort_order: Set(input.sort_order),
            is_active: Set(input.is_active),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        notifications::record(
            &*self.db,
            format!("Categoria '{}' creada", created.name),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(category_id = created.id, "Category created");
        Ok(created)
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: i32,
        input: CategoryInput,
        actor: &Actor,
    ) -> Result<category::Model, ServiceError> {
        input.validate()?;
        let existing = self.get(id).await?;
        let name = input.name.trim().to_string();
        self.ensure_name_free(&name, Some(id)).await?;

        let mut active: category::ActiveModel = existing.into();
        active.slug = Set(slugify(&name));
        active.name = Set(name);
        active.description = Set(input.description.and_then(non_blank));
        active.icon = Set(input
            .icon
            .and_then(non_blank)
            .unwrap_or_else(|| DEFAULT_ICON.to_string()));
        active.sort_order = Set(input.sort_order);
        active.is_active = Set(input.is_active);
        let updated = active.update(&*self.db).await?;

        notifications::record(
            &*self.db,
            format!("Categoria '{}' actualizada", updated.name),
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        Ok(updated)
    }

    /// Refused while any product still belongs to the category.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let products = self.product_count(id).await?;
        if products > 0 {
            return Err(ServiceError::Conflict(format!(
                "Category '{}' still has {} product(s)",
                existing.name, products
            )));
        }
        Category::delete_by_id(id).exec(&*self.db).await?;
        notifications::record(
            &*self.db,
            format!("Categoria '{}' eliminada", existing.name),
            NotificationKind::Warning,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(category_id = id, "Category deleted");
        Ok(())
    }

    async fn product_count(&self, category_id: i32) -> Result<u64, ServiceError> {
        Ok(Product::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&*self.db)
            .await?)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i32>) -> Result<(), ServiceError> {
        let mut query = Category::find().filter(category::Column::Name.eq(name));
        if let Some(id) = except {
            query = query.filter(category::Column::Id.ne(id));
        }
        if query.count(&*self.db).await? > 0 {
            return Err(ServiceError::Conflict(format!(
                "A category named '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
