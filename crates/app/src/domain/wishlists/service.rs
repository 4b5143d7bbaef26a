//! Wishlists service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        products::models::{Product, ProductUuid},
        users::models::UserUuid,
        wishlists::{
            errors::WishlistsServiceError, models::WishlistToggle,
            repository::PgWishlistsRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgWishlistsService {
    db: Db,
    repository: PgWishlistsRepository,
}

impl PgWishlistsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgWishlistsRepository::new(),
        }
    }
}

#[async_trait]
impl WishlistsService for PgWishlistsService {
    async fn toggle(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<WishlistToggle, WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let removed = self.repository.remove_item(&mut tx, user, product).await?;

        let toggle = if removed > 0 {
            WishlistToggle::Removed
        } else {
            self.repository.add_item(&mut tx, user, product).await?;
            WishlistToggle::Added
        };

        tx.commit().await?;

        Ok(toggle)
    }

    async fn get_wishlist(&self, user: UserUuid) -> Result<Vec<Product>, WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.get_products(&mut tx, user).await?;

        tx.commit().await?;

        Ok(products)
    }
}

#[automock]
#[async_trait]
pub trait WishlistsService: Send + Sync {
    /// Add `product` to the wishlist, or take it off if it is already there.
    async fn toggle(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<WishlistToggle, WishlistsServiceError>;

    async fn get_wishlist(&self, user: UserUuid) -> Result<Vec<Product>, WishlistsServiceError>;
}
