//! Public storefront reads. Only active products are visible.

use crate::{
    entities::product::{self, Entity as Product},
    errors::ServiceError,
    services::{
        page_window,
        products::{attach_details, ProductWithImages},
        Page,
    },
};
use rand::seq::SliceRandom;
use sea_orm::{
    sea_query::Expr, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

pub const CATALOG_PAGE_SIZE: u64 = 12;
const HOME_SECTION_SIZE: u64 = 8;
const HOME_LATEST_SIZE: u64 = 12;
const RELATED_SIZE: u64 = 4;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CatalogSort {
    #[default]
    Recientes,
    Antiguos,
    PrecioAsc,
    PrecioDesc,
    NombreAsc,
    NombreDesc,
    Populares,
}

impl CatalogSort {
    /// Unknown values fall back to newest first.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }

    fn apply(self, query: Select<Product>) -> Select<Product> {
        let query = match self {
            CatalogSort::Recientes => query.order_by_desc(product::Column::CreatedAt),
            CatalogSort::Antiguos => query.order_by_asc(product::Column::CreatedAt),
            CatalogSort::PrecioAsc => query.order_by_asc(product::Column::Price),
            CatalogSort::PrecioDesc => query.order_by_desc(product::Column::Price),
            CatalogSort::NombreAsc => query.order_by_asc(product::Column::Name),
            CatalogSort::NombreDesc => query.order_by_desc(product::Column::Name),
            CatalogSort::Populares => query.order_by_desc(product::Column::Views),
        };
        query.order_by_desc(product::Column::Id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub page: u64,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub category_id: Option<i32>,
    pub sort: CatalogSort,
}

#[derive(Debug, Clone)]
pub struct HomeSections {
    pub new_arrivals: Vec<ProductWithImages>,
    pub trending: Vec<ProductWithImages>,
    pub featured: Vec<ProductWithImages>,
    pub latest: Vec<ProductWithImages>,
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn active() -> Select<Product> {
        Product::find().filter(product::Column::IsActive.eq(true))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, query: CatalogQuery) -> Result<Page<ProductWithImages>, ServiceError> {
        let (page, per_page) =
            page_window(query.page, query.per_page.unwrap_or(CATALOG_PAGE_SIZE), 60);
        let mut select = Self::active();
        if let Some(category_id) = query.category_id {
            select = select.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(product::Column::Name.contains(search))
                    .add(product::Column::Description.contains(search)),
            );
        }

        let paginator = query.sort.apply(select).paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;
        Ok(Page {
            items: attach_details(&*self.db, products).await?,
            total,
            page,
            per_page,
        })
    }

    /// Counts a view and returns the product with up to four active products
    /// from the same category.
    #[instrument(skip(self))]
    pub async fn product_detail(
        &self,
        id: i32,
    ) -> Result<(ProductWithImages, Vec<ProductWithImages>), ServiceError> {
        Product::update_many()
            .col_expr(
                product::Column::Views,
                Expr::col(product::Column::Views).add(1),
            )
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::IsActive.eq(true))
            .exec(&*self.db)
            .await?;

        let product = Self::active()
            .filter(product::Column::Id.eq(id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let related = match product.category_id {
            Some(category_id) => {
                Self::active()
                    .filter(product::Column::CategoryId.eq(category_id))
                    .filter(product::Column::Id.ne(id))
                    .order_by_desc(product::Column::CreatedAt)
                    .limit(RELATED_SIZE)
                    .all(&*self.db)
                    .await?
            }
            None => Vec::new(),
        };
        debug!(product_id = id, views = product.views, related = related.len(), "Product viewed");

        let mut detail = attach_details(&*self.db, vec![product]).await?;
        let product = detail
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;
        Ok((product, attach_details(&*self.db, related).await?))
    }

    /// Flagged sections are shuffled so the home page varies between visits.
    #[instrument(skip(self))]
    pub async fn home(&self) -> Result<HomeSections, ServiceError> {
        let mut new_arrivals = self.section(product::Column::IsNew).await?;
        let mut trending = self.section(product::Column::IsTrending).await?;
        let mut featured = self.section(product::Column::IsFeatured).await?;
        let latest = Self::active()
            .order_by_desc(product::Column::CreatedAt)
            .order_by_desc(product::Column::Id)
            .limit(HOME_LATEST_SIZE)
            .all(&*self.db)
            .await?;

        {
            let mut rng = rand::thread_rng();
            new_arrivals.shuffle(&mut rng);
            trending.shuffle(&mut rng);
            featured.shuffle(&mut rng);
        }

        Ok(HomeSections {
            new_arrivals: attach_details(&*self.db, new_arrivals).await?,
            trending: attach_details(&*self.db, trending).await?,
            featured: attach_details(&*self.db, featured).await?,
            latest: attach_details(&*self.db, latest).await?,
        })
    }

    async fn section(&self, flag: product::Column) -> Result<Vec<product::Model>, ServiceError> {
        Ok(Self::active()
            .filter(flag.eq(true))
            .order_by_desc(product::Column::CreatedAt)
            .limit(HOME_SECTION_SIZE)
            .all(&*self.db)
            .await?)
    }
}
