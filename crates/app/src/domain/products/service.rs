//! Products service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        pagination::{Page, PageRequest},
        products::{
            errors::ProductsServiceError,
            models::{NewProduct, Product, ProductFilter, ProductUpdate, ProductUuid},
            repository::PgProductsRepository,
        },
        users::models::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

fn ensure_priced(price: u64) -> Result<(), ProductsServiceError> {
    if price == 0 {
        return Err(ProductsServiceError::InvalidPrice);
    }

    Ok(())
}

fn ensure_titled(title: &str) -> Result<(), ProductsServiceError> {
    if title.trim().is_empty() {
        return Err(ProductsServiceError::MissingRequiredData);
    }

    Ok(())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn search_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let (products, total) = self
            .repository
            .search_products(&mut tx, &filter, page)
            .await?;

        tx.commit().await?;

        Ok(Page::new(products, page, total))
    }

    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self
            .repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        exporter: UserUuid,
        product: NewProduct,
    ) -> Result<Product, ProductsServiceError> {
        ensure_titled(&product.title)?;
        ensure_priced(product.price)?;

        let mut tx = self.db.begin().await?;

        let created = self
            .repository
            .create_product(&mut tx, exporter, &product)
            .await?;

        tx.commit().await?;

        info!(product = %created.uuid, exporter = %exporter, "product created");

        Ok(created)
    }

    async fn update_product(
        &self,
        exporter: UserUuid,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError> {
        ensure_titled(&update.title)?;
        ensure_priced(update.price)?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, exporter, product, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(
        &self,
        exporter: UserUuid,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .delete_product(&mut tx, exporter, product)
            .await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(product = %product, exporter = %exporter, "product deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Search the catalog. An empty filter lists every product.
    async fn search_products(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<Product, ProductsServiceError>;

    /// Creates a product owned by `exporter`.
    async fn create_product(
        &self,
        exporter: UserUuid,
        product: NewProduct,
    ) -> Result<Product, ProductsServiceError>;

    /// Replaces the editable fields of a product owned by `exporter`.
    async fn update_product(
        &self,
        exporter: UserUuid,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<Product, ProductsServiceError>;

    /// Deletes a product owned by `exporter`.
    async fn delete_product(
        &self,
        exporter: UserUuid,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;
}
