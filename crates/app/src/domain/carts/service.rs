//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        carts::{
            errors::CartsServiceError,
            models::{Cart, CartOwner, NewCartItem},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        products::{models::ProductUuid, repository::PgProductsRepository},
        promotions::{
            models::PromoQuote, repository::PgPromotionsRepository, service::price_promo,
        },
    },
};

/// A cart after a promo code was applied, with the pricing that was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoApplication {
    pub cart: Cart,
    pub quote: PromoQuote,
}

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    promotions_repository: PgPromotionsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            promotions_repository: PgPromotionsRepository::new(),
        }
    }

    async fn lock_with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: &CartOwner,
    ) -> Result<Cart, CartsServiceError> {
        let mut cart = self
            .carts_repository
            .lock_cart(tx, owner)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        self.load_items(tx, &mut cart).await?;

        Ok(cart)
    }

    /// Attach the cart's lines and persist a repriced header if lines vanished.
    async fn load_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &mut Cart,
    ) -> Result<(), CartsServiceError> {
        cart.items = self.items_repository.get_cart_items(tx, cart.uuid).await?;

        if cart.reconcile() {
            self.carts_repository.update_cart(tx, cart).await?;

            debug!(cart = %cart.uuid, total = cart.total_price, "stale cart total repriced");
        }

        Ok(())
    }

    async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cart: &mut Cart,
    ) -> Result<(), CartsServiceError> {
        self.items_repository
            .replace_cart_items(tx, cart.uuid, &cart.items)
            .await?;

        self.carts_repository.update_cart(tx, cart).await?;

        Ok(())
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, owner: CartOwner) -> Result<Option<Cart>, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let Some(mut cart) = self.carts_repository.find_cart(&mut tx, &owner).await? else {
            return Ok(None);
        };

        self.load_items(&mut tx, &mut cart).await?;

        tx.commit().await?;

        Ok(Some(cart))
    }

    async fn add_item(
        &self,
        owner: CartOwner,
        item: NewCartItem,
    ) -> Result<Cart, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        if item.price == 0 {
            return Err(CartsServiceError::InvalidPrice);
        }

        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_stock(&mut tx, item.product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        let mut cart = self
            .carts_repository
            .lock_or_create_cart(&mut tx, &owner)
            .await?;

        self.load_items(&mut tx, &mut cart).await?;

        cart.add_item(item)?;

        self.save(&mut tx, &mut cart).await?;

        tx.commit().await?;

        debug!(cart = %cart.uuid, owner = %owner, product = %item.product, "cart item added");

        Ok(cart)
    }

    async fn update_quantity(
        &self,
        owner: CartOwner,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.lock_with_items(&mut tx, &owner).await?;

        cart.set_quantity(product, quantity)?;

        self.save(&mut tx, &mut cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn remove_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.lock_with_items(&mut tx, &owner).await?;

        cart.remove_item(product)?;

        self.save(&mut tx, &mut cart).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn apply_promo(
        &self,
        owner: CartOwner,
        code: String,
        now: Timestamp,
    ) -> Result<PromoApplication, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.lock_with_items(&mut tx, &owner).await?;

        let quote = price_promo(
            &mut tx,
            &self.promotions_repository,
            &self.products_repository,
            &code,
            cart.total_price,
            &cart.promo_lines(),
            now,
        )
        .await?;

        cart.apply_promo(&quote);

        self.carts_repository.update_cart(&mut tx, &mut cart).await?;

        tx.commit().await?;

        info!(
            cart = %cart.uuid,
            owner = %owner,
            code = %quote.promo.code,
            discount = quote.discount_amount,
            "promo code applied"
        );

        Ok(PromoApplication { cart, quote })
    }

    async fn clear_cart(&self, owner: CartOwner) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        self.carts_repository.delete_cart(&mut tx, &owner).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn count_items(&self, owner: CartOwner) -> Result<u64, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let count = self.carts_repository.count_items(&mut tx, &owner).await?;

        tx.commit().await?;

        Ok(count)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The owner's cart with its lines, `None` when no cart exists yet.
    async fn get_cart(&self, owner: CartOwner) -> Result<Option<Cart>, CartsServiceError>;

    /// Add a line, creating the cart on first use.
    async fn add_item(&self, owner: CartOwner, item: NewCartItem)
    -> Result<Cart, CartsServiceError>;

    /// Set a line's quantity. Zero removes the line.
    async fn update_quantity(
        &self,
        owner: CartOwner,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<Cart, CartsServiceError>;

    /// Remove a line. Removing a product that is not in the cart changes nothing.
    async fn remove_item(
        &self,
        owner: CartOwner,
        product: ProductUuid,
    ) -> Result<Cart, CartsServiceError>;

    /// Price a promo code against the cart and store the discount on it.
    async fn apply_promo(
        &self,
        owner: CartOwner,
        code: String,
        now: Timestamp,
    ) -> Result<PromoApplication, CartsServiceError>;

    /// Delete the cart. Clearing a missing cart succeeds.
    async fn clear_cart(&self, owner: CartOwner) -> Result<(), CartsServiceError>;

    /// Number of distinct lines in the cart.
    async fn count_items(&self, owner: CartOwner) -> Result<u64, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::models::GuestSessionId,
            products::ProductsService,
            promotions::{
                PromotionsService, PromotionsServiceError,
                models::{DiscountKind, NewPromoCode, PromoCodeUuid},
            },
        },
        test::{TestContext, helpers::new_product},
    };

    use super::*;

    fn line(product: ProductUuid, quantity: u64, price: u64) -> NewCartItem {
        NewCartItem {
            product,
            quantity,
            price,
        }
    }

    #[tokio::test]
    async fn missing_cart_reads_as_none() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_buyer("Buyer").await;

        assert!(ctx.carts.get_cart(CartOwner::User(buyer)).await?.is_none());
        assert_eq!(ctx.carts.count_items(CartOwner::User(buyer)).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_creates_cart_and_merges_lines() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;
        let owner = CartOwner::User(buyer);

        let product = ctx
            .products
            .create_product(exporter, new_product("Teapot", 1_000, 10))
            .await?;

        ctx.carts
            .add_item(owner.clone(), line(product.uuid, 1, 1_000))
            .await?;
        let cart = ctx
            .carts
            .add_item(owner.clone(), line(product.uuid, 2, 1_000))
            .await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_price, 3_000);

        let stored = ctx.carts.get_cart(owner.clone()).await?;
        assert_eq!(stored.map(|cart| cart.total_price), Some(3_000));
        assert_eq!(ctx.carts.count_items(owner).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_unknown_product_returns_product_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_buyer("Buyer").await;

        let result = ctx
            .carts
            .add_item(CartOwner::User(buyer), line(ProductUuid::new(), 1, 100))
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::ProductNotFound)),
            "expected ProductNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn guest_cart_supports_update_and_remove() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let owner = CartOwner::Guest(GuestSessionId::new("guest-session-1")?);

        let tea = ctx
            .products
            .create_product(exporter, new_product("Tea", 500, 10))
            .await?;
        let mug = ctx
            .products
            .create_product(exporter, new_product("Mug", 1_200, 10))
            .await?;

        ctx.carts.add_item(owner.clone(), line(tea.uuid, 1, 500)).await?;
        ctx.carts.add_item(owner.clone(), line(mug.uuid, 1, 1_200)).await?;

        let cart = ctx.carts.update_quantity(owner.clone(), tea.uuid, 4).await?;
        assert_eq!(cart.total_price, 3_200);

        let cart = ctx.carts.remove_item(owner.clone(), mug.uuid).await?;
        assert_eq!(cart.total_price, 2_000);
        assert_eq!(cart.items.len(), 1);

        ctx.carts.clear_cart(owner.clone()).await?;
        assert!(ctx.carts.get_cart(owner).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_without_cart_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_buyer("Buyer").await;

        let result = ctx
            .carts
            .update_quantity(CartOwner::User(buyer), ProductUuid::new(), 2)
            .await;

        assert!(
            matches!(result, Err(CartsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_fixed_promo_discounts_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;
        let owner = CartOwner::User(buyer);

        let product = ctx
            .products
            .create_product(exporter, new_product("Lantern", 1_000, 10))
            .await?;

        ctx.promotions
            .create_promo(
                exporter,
                NewPromoCode {
                    uuid: PromoCodeUuid::new(),
                    code: "FIVEOFF".to_string(),
                    description: "Five off".to_string(),
                    discount_type: DiscountKind::Fixed,
                    discount_value: 500,
                    min_order_amount: 0,
                    max_uses: None,
                    valid_from: None,
                    valid_until: None,
                },
            )
            .await?;

        ctx.carts
            .add_item(owner.clone(), line(product.uuid, 3, 1_000))
            .await?;

        let applied = ctx
            .carts
            .apply_promo(owner.clone(), "fiveoff".to_string(), Timestamp::now())
            .await?;

        assert_eq!(applied.cart.total_price, 3_000);
        assert_eq!(applied.cart.discount, 500);
        assert_eq!(applied.cart.amount_due(), 2_500);

        let stored = ctx.carts.get_cart(owner).await?;
        assert_eq!(
            stored.and_then(|cart| cart.applied_promo).map(|promo| promo.code),
            Some("FIVEOFF".to_string())
        );

        Ok(())
    }

    #[tokio::test]
    async fn apply_unknown_promo_leaves_cart_untouched() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;
        let owner = CartOwner::User(buyer);

        let product = ctx
            .products
            .create_product(exporter, new_product("Lantern", 1_000, 10))
            .await?;

        ctx.carts
            .add_item(owner.clone(), line(product.uuid, 1, 1_000))
            .await?;

        let result = ctx
            .carts
            .apply_promo(owner.clone(), "MISSING".to_string(), Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::Promotion(PromotionsServiceError::NotFound))
            ),
            "expected promotion NotFound, got {result:?}"
        );

        let stored = ctx.carts.get_cart(owner).await?;
        assert_eq!(stored.map(|cart| cart.discount), Some(0));

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_reprices_cart_and_drops_promo() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;
        let owner = CartOwner::User(buyer);

        let kept = ctx
            .products
            .create_product(exporter, new_product("Kettle", 1_000, 10))
            .await?;
        let deleted = ctx
            .products
            .create_product(exporter, new_product("Cosy", 500, 10))
            .await?;

        ctx.promotions
            .create_promo(
                exporter,
                NewPromoCode {
                    uuid: PromoCodeUuid::new(),
                    code: "TWOOFF".to_string(),
                    description: String::new(),
                    discount_type: DiscountKind::Fixed,
                    discount_value: 200,
                    min_order_amount: 0,
                    max_uses: None,
                    valid_from: None,
                    valid_until: None,
                },
            )
            .await?;

        ctx.carts.add_item(owner.clone(), line(kept.uuid, 1, 1_000)).await?;
        ctx.carts.add_item(owner.clone(), line(deleted.uuid, 1, 500)).await?;
        ctx.carts
            .apply_promo(owner.clone(), "TWOOFF".to_string(), Timestamp::now())
            .await?;

        ctx.products.delete_product(exporter, deleted.uuid).await?;

        let cart = ctx.carts.get_cart(owner.clone()).await?;
        assert_eq!(cart.as_ref().map(|cart| cart.total_price), Some(1_000));
        assert_eq!(cart.as_ref().map(Cart::amount_due), Some(1_000));
        assert!(cart.and_then(|cart| cart.applied_promo).is_none());

        let updated = ctx.carts.update_quantity(owner, kept.uuid, 2).await?;
        assert_eq!(updated.total_price, 2_000);

        Ok(())
    }
}
