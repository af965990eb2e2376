use crate::{
    entities::{
        category::{self, Entity as Category},
        notification::NotificationKind,
        order::{self, Entity as Order},
        product::{self, Entity as Product},
        product_image::{self, Entity as ProductImage},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        images::{product_folder, ImageStore},
        notifications, page_window,
        settings::non_blank,
        slug::slugify,
        Actor, Page,
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

pub const ADMIN_PAGE_SIZE: u64 = 15;

/// A product with its category and images (main image first).
#[derive(Debug, Clone)]
pub struct ProductWithImages {
    pub product: product::Model,
    pub category: Option<category::Model>,
    pub images: Vec<product_image::Model>,
}

impl ProductWithImages {
    /// The flagged main image, else the first by sort order.
    pub fn main_image(&self) -> Option<&product_image::Model> {
        self.images
            .iter()
            .find(|img| img.is_main)
            .or_else(|| self.images.first())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(length(max = 50))]
    pub sku: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ImageUpload {
    /// Original file name; only its extension is used.
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    /// Base64 bytes or a `data:` URL.
    #[validate(length(min = 1))]
    pub data: String,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AdminProductFilter {
    pub search: Option<String>,
    pub category_id: Option<i32>,
}

/// Loads categories and images for a batch of products, keeping order.
pub(crate) async fn attach_details<C: ConnectionTrait>(
    conn: &C,
    products: Vec<product::Model>,
) -> Result<Vec<ProductWithImages>, ServiceError> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let category_ids: Vec<i32> = products.iter().filter_map(|p| p.category_id).collect();

    let mut images: HashMap<i32, Vec<product_image::Model>> = HashMap::new();
    for image in ProductImage::find()
        .filter(product_image::Column::ProductId.is_in(ids))
        .order_by_desc(product_image::Column::IsMain)
        .order_by_asc(product_image::Column::SortOrder)
        .order_by_asc(product_image::Column::Id)
        .all(conn)
        .await?
    {
        images.entry(image.product_id).or_default().push(image);
    }

    let categories: HashMap<i32, category::Model> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        Category::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    Ok(products
        .into_iter()
        .map(|product| ProductWithImages {
            category: product.category_id.and_then(|id| categories.get(&id).cloned()),
            images: images.remove(&product.id).unwrap_or_default(),
            product,
        })
        .collect())
}

fn check_prices(input: &ProductInput) -> Result<(), ServiceError> {
    if input.price.is_sign_negative() {
        return Err(ServiceError::ValidationError(
            "price cannot be negative".to_string(),
        ));
    }
    if matches!(input.original_price, Some(p) if p.is_sign_negative()) {
        return Err(ServiceError::ValidationError(
            "original_price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

/// Back-office product management, including image files.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    images: ImageStore,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        images: ImageStore,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db,
            images,
            event_sender,
        }
    }

    /// Newest first, fifteen per page by default.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: AdminProductFilter,
        page: u64,
        per_page: Option<u64>,
    ) -> Result<Page<ProductWithImages>, ServiceError> {
        let (page, per_page) = page_window(page, per_page.unwrap_or(ADMIN_PAGE_SIZE), 100);
        let mut condition = Condition::all();
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            condition = condition.add(product::Column::Name.contains(search));
        }
        if let Some(category_id) = filter.category_id {
            condition = condition.add(product::Column::CategoryId.eq(category_id));
        }
        let paginator = Product::find()
            .filter(condition)
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items: attach_details(&*self.db, products).await?,
            total,
            page,
            per_page,
        })
    }

    pub async fn get(&self, id: i32) -> Result<ProductWithImages, ServiceError> {
        let product = self.find(id).await?;
        attach_details(&*self.db, vec![product])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    #[instrument(skip(self, input, actor), fields(name = %input.name))]
    pub async fn create(
        &self,
        input: ProductInput,
        actor: &Actor,
    ) -> Result<ProductWithImages, ServiceError> {
        input.validate()?;
        check_prices(&input)?;
        self.ensure_category(input.category_id).await?;

        let now = Utc::now();
        let name = input.name.trim().to_string();
        let created = product::ActiveModel {
            slug: Set(slugify(&name)),
            name: Set(name),
            description: Set(input.description.and_then(non_blank)),
            price: Set(input.price.round_dp(2)),
            original_price: Set(input.original_price.map(|p| p.round_dp(2))),
            stock: Set(input.stock),
            sku: Set(input.sku.and_then(non_blank)),
            category_id: Set(input.category_id),
            is_active: Set(input.is_active),
            is_new: Set(input.is_new),
            is_trending: Set(input.is_trending),
            is_featured: Set(input.is_featured),
            views: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        notifications::record(
            &*self.db,
            format!("Producto '{}' creado", created.name),
            NotificationKind::Success,
            Some(actor.name.as_str()),
        )
        .await?;
        info!(product_id = created.id, "Product created");
        self.emit(Event::ProductChanged(created.id)).await;
        self.get(created.id).await
    }

    #[instrument(skip(self, input, actor))]
    pub async fn update(
        &self,
        id: i32,
        input: ProductInput,
        actor: &Actor,
    ) -> Result<ProductWithImages, ServiceError> {
        input.validate()?;
        check_prices(&input)?;
        let existing = self.find(id).await?;
        self.ensure_category(input.category_id).await?;

        let name = input.name.trim().to_string();
        let mut active: product::ActiveModel = existing.into();
        active.slug = Set(slugify(&name));
        active.name = Set(name);
        active.description = Set(input.description.and_then(non_blank));
        active.price = Set(input.price.round_dp(2));
        active.original_price = Set(input.original_price.map(|p| p.round_dp(2)));
        active.stock = Set(input.stock);
        active.sku = Set(input.sku.and_then(non_blank));
        active.category_id = Set(input.category_id);
        active.is_active = Set(input.is_active);
        active.is_new = Set(input.is_new);
        active.is_trending = Set(input.is_trending);
        active.is_featured = Set(input.is_featured);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        notifications::record(
            &*self.db,
            format!("Producto '{}' actualizado", updated.name),
            NotificationKind::Info,
            Some(actor.name.as_str()),
        )
        .await?;
        self.emit(Event::ProductChanged(id)).await;
        self.get(id).await
    }

    /// Refused while orders reference the product. Image files are removed
    /// after the rows are gone.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, id: i32, actor: &Actor) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;
        let orders = Order::find()
            .filter(order::Column::ProductId.eq(id))
            .count(&*self.db)
            .await?;
        if orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Product '{}' has {} order(s) and cannot be deleted",
                existing.name, orders
            )));
        }

        let txn = self.db.begin().await?;
        let images = ProductImage::find()
            .filter(product_image::Column::ProductId.eq(id))
            .all(&txn)
            .await?;
        ProductImage::delete_many()
            .filter(product_image::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;
        Product::delete_by_id(id).exec(&txn).await?;
        notifications::record(
            &txn,
            format!("Producto '{}' eliminado", existing.name),
            NotificationKind::Danger,
            Some(actor.name.as_str()),
        )
        .await?;
        txn.commit().await?;

        let mut folders: Vec<String> = images
            .iter()
            .filter_map(|img| img.filename.split_once('/').map(|(dir, _)| dir.to_string()))
            .collect();
        folders.push(product_folder(&existing.slug, id));
        folders.sort();
        folders.dedup();
        for folder in folders {
            self.images.remove_folder(&folder).await;
        }

        info!(product_id = id, "Product deleted");
        self.emit(Event::ProductChanged(id)).await;
        Ok(())
    }

    /// Stores an uploaded image. The first image of a product, or one
    /// flagged `is_main`, becomes the main image.
    #[instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn add_image(
        &self,
        id: i32,
        upload: ImageUpload,
    ) -> Result<ProductWithImages, ServiceError> {
        upload.validate()?;
        let product = self.find(id).await?;
        let folder = product_folder(&product.slug, id);
        let filename = self
            .images
            .save_base64(&folder, id, &upload.filename, &upload.data)
            .await?;

        let result = async {
            let txn = self.db.begin().await?;
            let existing = ProductImage::find()
                .filter(product_image::Column::ProductId.eq(id))
                .count(&txn)
                .await?;
            let make_main = upload.is_main || existing == 0;
            if make_main {
                clear_main(&txn, id).await?;
            }
            product_image::ActiveModel {
                product_id: Set(id),
                filename: Set(filename.clone()),
                is_main: Set(make_main),
                sort_order: Set(existing as i32),
                created_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, ServiceError>(())
        }
        .await;

        if let Err(e) = result {
            // the file is already on disk; drop it so it doesn't linger
            self.images.remove_file(&filename).await;
            return Err(e);
        }
        self.emit(Event::ProductChanged(id)).await;
        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn set_main_image(
        &self,
        id: i32,
        image_id: i32,
    ) -> Result<ProductWithImages, ServiceError> {
        let txn = self.db.begin().await?;
        let image = find_image(&txn, id, image_id).await?;
        clear_main(&txn, id).await?;
        let mut active: product_image::ActiveModel = image.into();
        active.is_main = Set(true);
        active.update(&txn).await?;
        txn.commit().await?;
        self.get(id).await
    }

    /// Removes the row, then the file. If the main image goes, the next one
    /// takes its place.
    #[instrument(skip(self))]
    pub async fn delete_image(
        &self,
        id: i32,
        image_id: i32,
    ) -> Result<ProductWithImages, ServiceError> {
        let txn = self.db.begin().await?;
        let image = find_image(&txn, id, image_id).await?;
        ProductImage::delete_by_id(image.id).exec(&txn).await?;
        if image.is_main {
            if let Some(next) = ProductImage::find()
                .filter(product_image::Column::ProductId.eq(id))
                .order_by_asc(product_image::Column::SortOrder)
                .order_by_asc(product_image::Column::Id)
                .one(&txn)
                .await?
            {
                let mut active: product_image::ActiveModel = next.into();
                active.is_main = Set(true);
                active.update(&txn).await?;
            }
        }
        txn.commit().await?;

        self.images.remove_file(&image.filename).await;
        self.get(id).await
    }

    async fn find(&self, id: i32) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    async fn ensure_category(&self, category_id: Option<i32>) -> Result<(), ServiceError> {
        if let Some(category_id) = category_id {
            if Category::find_by_id(category_id)
                .one(&*self.db)
                .await?
                .is_none()
            {
                return Err(ServiceError::ValidationError(format!(
                    "Category {} does not exist",
                    category_id
                )));
            }
        }
        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event).await {
                warn!(error = %e, "Failed to publish product event");
            }
        }
    }
}

async fn clear_main<C: ConnectionTrait>(conn: &C, product_id: i32) -> Result<(), ServiceError> {
    ProductImage::update_many()
        .col_expr(product_image::Column::IsMain, Expr::value(false))
        .filter(product_image::Column::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn find_image<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    image_id: i32,
) -> Result<product_image::Model, ServiceError> {
    ProductImage::find_by_id(image_id)
        .filter(product_image::Column::ProductId.eq(product_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Image {} not found for product {}",
                image_id, product_id
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: i32, is_main: bool) -> product_image::Model {
        product_image::Model {
            id,
            product_id: 1,
            filename: format!("x_1/prod_1_{id}.png"),
            is_main,
            sort_order: id,
            created_at: Utc::now(),
        }
    }

    fn product() -> product::Model {
        product::Model {
            id: 1,
            name: "Blusa".into(),
            slug: "blusa".into(),
            description: None,
            price: Decimal::new(150, 0),
            original_price: None,
            stock: 1,
            sku: None,
            category_id: None,
            is_active: true,
            is_new: false,
            is_trending: false,
            is_featured: false,
            views: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn flagged_main_image_wins() {
        let p = ProductWithImages {
            product: product(),
            category: None,
            images: vec![image(1, false), image(2, true)],
        };
        assert_eq!(p.main_image().map(|i| i.id), Some(2));
    }

    #[test]
    fn first_image_is_the_fallback() {
        let p = ProductWithImages {
            product: product(),
            category: None,
            images: vec![image(3, false), image(4, false)],
        };
        assert_eq!(p.main_image().map(|i| i.id), Some(3));
    }
}
