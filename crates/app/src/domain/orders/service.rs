//! Orders service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            models::CartOwner,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        orders::{
            errors::OrdersServiceError,
            models::{
                Approval, ItemStatus, Order, OrderItem, OrderItemUuid, OrderUuid, PaymentReceipt,
                derive_status,
            },
            repositories::{NewOrder, PgOrderItemsRepository, PgOrdersRepository},
        },
        pagination::{Page, PageRequest},
        products::{models::ProductUuid, repository::PgProductsRepository},
        promotions::repository::PgPromotionsRepository,
        users::{models::UserUuid, repository::PgUsersRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders_repository: PgOrdersRepository,
    items_repository: PgOrderItemsRepository,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    promotions_repository: PgPromotionsRepository,
    users_repository: PgUsersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders_repository: PgOrdersRepository::new(),
            items_repository: PgOrderItemsRepository::new(),
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            promotions_repository: PgPromotionsRepository::new(),
            users_repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_from_cart(
        &self,
        user: UserUuid,
        payment: PaymentReceipt,
    ) -> Result<Order, OrdersServiceError> {
        if payment.payment_id.trim().is_empty() {
            return Err(OrdersServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        self.users_repository
            .find_user(&mut tx, user)
            .await?
            .ok_or(OrdersServiceError::UserNotFound)?;

        let owner = CartOwner::User(user);

        let mut cart = self
            .carts_repository
            .lock_cart(&mut tx, &owner)
            .await?
            .ok_or(OrdersServiceError::EmptyCart)?;

        cart.items = self
            .cart_items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        if cart.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        if cart.reconcile() {
            warn!(cart = %cart.uuid, user = %user, "cart lines changed since they were priced");
        }

        if !payment.matches(&cart) {
            warn!(
                cart = %cart.uuid,
                user = %user,
                amount_due = cart.amount_due(),
                amount_paid = ?payment.amount_paid,
                "cart no longer matches the payment"
            );

            return Err(OrdersServiceError::CartChanged);
        }

        let products: Vec<ProductUuid> = cart.items.iter().map(|item| item.product).collect();
        let catalog = self
            .products_repository
            .find_line_products(&mut tx, &products)
            .await?;

        let items = cart
            .items
            .iter()
            .map(|item| {
                let product = catalog
                    .get(&item.product)
                    .ok_or(OrdersServiceError::ProductNotFound)?;

                Ok(OrderItem {
                    uuid: OrderItemUuid::new(),
                    product: item.product,
                    exporter: product.exporter,
                    quantity: item.quantity,
                    price: item.price,
                    status: ItemStatus::Pending,
                    approved_at: None,
                })
            })
            .collect::<Result<Vec<_>, OrdersServiceError>>()?;

        let promo_code = cart.applied_promo.as_ref().map(|promo| promo.code.as_str());

        let mut order = self
            .orders_repository
            .create_order(
                &mut tx,
                &NewOrder {
                    uuid: OrderUuid::new(),
                    user,
                    total_amount: cart.amount_due(),
                    payment_id: &payment.payment_id,
                    promo_code,
                },
            )
            .await?;

        self.items_repository
            .create_order_items(&mut tx, order.uuid, &items)
            .await?;

        if let Some(code) = promo_code {
            let counted = self
                .promotions_repository
                .increment_usage(&mut tx, code)
                .await?;

            if counted == 0 {
                if self
                    .promotions_repository
                    .find_by_code(&mut tx, code)
                    .await?
                    .is_some()
                {
                    return Err(OrdersServiceError::PromoLimitReached);
                }

                warn!(code = %code, order = %order.uuid, "applied promo code no longer exists");
            }
        }

        self.carts_repository.delete_cart(&mut tx, &owner).await?;

        self.items_repository
            .attach_items(&mut tx, std::slice::from_mut(&mut order))
            .await?;

        tx.commit().await?;

        info!(
            order = %order.uuid,
            user = %user,
            total = order.total_amount,
            lines = order.items.len(),
            "order created"
        );

        Ok(order)
    }

    async fn list_buyer_orders(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<Page<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let (mut orders, total) = self
            .orders_repository
            .list_buyer_orders(&mut tx, user, page)
            .await?;

        self.items_repository
            .attach_items(&mut tx, &mut orders)
            .await?;

        tx.commit().await?;

        Ok(Page::new(orders, page, total))
    }

    async fn get_buyer_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut order = self
            .orders_repository
            .find_buyer_order(&mut tx, user, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        self.items_repository
            .attach_items(&mut tx, std::slice::from_mut(&mut order))
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn list_exporter_orders(
        &self,
        exporter: UserUuid,
        page: PageRequest,
    ) -> Result<Page<Order>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let (mut orders, total) = self
            .orders_repository
            .list_exporter_orders(&mut tx, exporter, page)
            .await?;

        self.items_repository
            .attach_pending_items(&mut tx, exporter, &mut orders)
            .await?;

        tx.commit().await?;

        Ok(Page::new(orders, page, total))
    }

    async fn approve_item(
        &self,
        exporter: UserUuid,
        order: OrderUuid,
        item: OrderItemUuid,
        now: Timestamp,
    ) -> Result<Approval, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let locked = self
            .orders_repository
            .lock_order(&mut tx, order)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let line = self
            .items_repository
            .lock_pending_item(&mut tx, exporter, order, item)
            .await?
            .ok_or(OrdersServiceError::NotFound)?;

        let Some(new_stock) = self
            .products_repository
            .decrement_stock(&mut tx, line.product, line.quantity)
            .await?
        else {
            let available = self
                .products_repository
                .find_stock(&mut tx, line.product)
                .await?
                .ok_or(OrdersServiceError::ProductNotFound)?;

            return Err(OrdersServiceError::InsufficientStock {
                requested: line.quantity,
                available,
            });
        };

        let approved = self
            .items_repository
            .approve_item(&mut tx, item, now)
            .await?;

        let mut current = locked;
        self.items_repository
            .attach_items(&mut tx, std::slice::from_mut(&mut current))
            .await?;

        let statuses: Vec<ItemStatus> = current.items.iter().map(|item| item.status).collect();
        let status = derive_status(current.status, &statuses);

        let updated = if status == current.status {
            current
        } else {
            let mut updated = self
                .orders_repository
                .update_status(&mut tx, order, status)
                .await?;

            updated.items = current.items;
            updated
        };

        tx.commit().await?;

        info!(
            order = %order,
            item = %item,
            exporter = %exporter,
            product = %line.product,
            new_stock,
            status = %updated.status,
            "order item approved"
        );

        Ok(Approval {
            order: updated,
            item: approved,
            product: line.product,
            new_stock,
        })
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the user's paid cart into an order and delete the cart.
    ///
    /// Fails with `CartChanged` when the cart is no longer the one `payment` paid for.
    async fn create_from_cart(
        &self,
        user: UserUuid,
        payment: PaymentReceipt,
    ) -> Result<Order, OrdersServiceError>;

    /// The user's orders, newest first.
    async fn list_buyer_orders(
        &self,
        user: UserUuid,
        page: PageRequest,
    ) -> Result<Page<Order>, OrdersServiceError>;

    /// One of the user's orders.
    async fn get_buyer_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// Orders awaiting approval from `exporter`, each carrying only that
    /// exporter's pending lines.
    async fn list_exporter_orders(
        &self,
        exporter: UserUuid,
        page: PageRequest,
    ) -> Result<Page<Order>, OrdersServiceError>;

    /// Approve one pending line and take its quantity out of stock.
    async fn approve_item(
        &self,
        exporter: UserUuid,
        order: OrderUuid,
        item: OrderItemUuid,
        now: Timestamp,
    ) -> Result<Approval, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, models::NewCartItem},
            orders::models::OrderStatus,
            products::{ProductsService, models::Product},
            promotions::{
                PromotionsService,
                models::{DiscountKind, NewPromoCode, PromoCodeUuid},
            },
        },
        test::{TestContext, helpers::new_product},
    };

    use super::*;

    async fn add_to_cart(ctx: &TestContext, buyer: UserUuid, product: &Product, quantity: u64) -> TestResult {
        ctx.carts
            .add_item(
                CartOwner::User(buyer),
                NewCartItem {
                    product: product.uuid,
                    quantity,
                    price: product.price,
                },
            )
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn create_from_cart_records_lines_and_deletes_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Lamp", 1_000, 10))
            .await?;

        ctx.promotions
            .create_promo(
                exporter,
                NewPromoCode {
                    uuid: PromoCodeUuid::new(),
                    code: "FIVE".to_string(),
                    description: String::new(),
                    discount_type: DiscountKind::Fixed,
                    discount_value: 500,
                    min_order_amount: 0,
                    max_uses: Some(10),
                    valid_from: None,
                    valid_until: None,
                },
            )
            .await?;

        add_to_cart(&ctx, buyer, &product, 3).await?;
        ctx.carts
            .apply_promo(CartOwner::User(buyer), "FIVE".to_string(), Timestamp::now())
            .await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_123"))
            .await?;

        assert_eq!(order.total_amount, 2_500);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.promo_code.as_deref(), Some("FIVE"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items.first().map(|item| item.exporter), Some(exporter));

        assert!(ctx.carts.get_cart(CartOwner::User(buyer)).await?.is_none());

        let promos = ctx.promotions.list_promos(exporter).await?;
        assert_eq!(promos.first().map(|promo| promo.current_uses), Some(1));

        Ok(())
    }

    #[tokio::test]
    async fn create_from_missing_cart_returns_empty_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let buyer = ctx.create_buyer("Buyer").await;

        let result = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_empty"))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn approval_decrements_stock_exactly_once() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Vase", 2_000, 5))
            .await?;

        add_to_cart(&ctx, buyer, &product, 2).await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_vase"))
            .await?;
        let item = order.items.first().map(|item| item.uuid).ok_or("order has no lines")?;

        let approval = ctx
            .orders
            .approve_item(exporter, order.uuid, item, Timestamp::now())
            .await?;

        assert_eq!(approval.new_stock, 3);
        assert_eq!(approval.order.status, OrderStatus::Approved);
        assert_eq!(approval.item.status, ItemStatus::Approved);
        assert!(approval.item.approved_at.is_some());

        let again = ctx
            .orders
            .approve_item(exporter, order.uuid, item, Timestamp::now())
            .await;

        assert!(
            matches!(again, Err(OrdersServiceError::NotFound)),
            "expected NotFound on second approval, got {again:?}"
        );

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock, 3);

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_leaves_stock_and_line_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Chair", 4_000, 3))
            .await?;

        add_to_cart(&ctx, buyer, &product, 5).await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_chair"))
            .await?;
        let item = order.items.first().map(|item| item.uuid).ok_or("order has no lines")?;

        let result = ctx
            .orders
            .approve_item(exporter, order.uuid, item, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InsufficientStock {
                    requested: 5,
                    available: 3
                })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        assert_eq!(ctx.products.get_product(product.uuid).await?.stock, 3);

        let stored = ctx.orders.get_buyer_order(buyer, order.uuid).await?;
        assert_eq!(
            stored.items.first().map(|item| item.status),
            Some(ItemStatus::Pending)
        );

        Ok(())
    }

    #[tokio::test]
    async fn other_exporter_cannot_approve_line() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let other = ctx.create_exporter("Other").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Stool", 1_500, 3))
            .await?;

        add_to_cart(&ctx, buyer, &product, 1).await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_stool"))
            .await?;
        let item = order.items.first().map(|item| item.uuid).ok_or("order has no lines")?;

        let result = ctx
            .orders
            .approve_item(other, order.uuid, item, Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn two_exporters_give_partial_approval_and_scoped_listings() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.create_exporter("First").await;
        let second = ctx.create_exporter("Second").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let spice = ctx
            .products
            .create_product(first, new_product("Spice", 800, 10))
            .await?;
        let cloth = ctx
            .products
            .create_product(second, new_product("Cloth", 2_200, 10))
            .await?;

        add_to_cart(&ctx, buyer, &spice, 1).await?;
        add_to_cart(&ctx, buyer, &cloth, 1).await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_mixed"))
            .await?;

        let pending = ctx
            .orders
            .list_exporter_orders(second, PageRequest::default())
            .await?;

        assert_eq!(pending.total_items, 1);
        let lines: Vec<ProductUuid> = pending
            .items
            .iter()
            .flat_map(|order| order.items.iter().map(|item| item.product))
            .collect();
        assert_eq!(lines, vec![cloth.uuid]);

        let spice_line = order
            .items
            .iter()
            .find(|item| item.product == spice.uuid)
            .map(|item| item.uuid)
            .ok_or("spice line missing")?;

        let approval = ctx
            .orders
            .approve_item(first, order.uuid, spice_line, Timestamp::now())
            .await?;

        assert_eq!(approval.order.status, OrderStatus::PartiallyApproved);

        let first_pending = ctx
            .orders
            .list_exporter_orders(first, PageRequest::default())
            .await?;
        assert_eq!(first_pending.total_items, 0);

        Ok(())
    }

    #[tokio::test]
    async fn buyer_orders_are_paginated_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Bowl", 600, 50))
            .await?;

        let mut created = Vec::new();
        for payment in ["pi_1", "pi_2", "pi_3"] {
            add_to_cart(&ctx, buyer, &product, 1).await?;
            let order = ctx
                .orders
                .create_from_cart(buyer, PaymentReceipt::new(payment))
                .await?;

            created.push(order.uuid);
        }

        let page = ctx
            .orders
            .list_buyer_orders(buyer, PageRequest::new(Some(1), Some(2)))
            .await?;

        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.first().map(|order| order.uuid), created.last().copied());

        Ok(())
    }

    fn promo(code: &str, discount_value: u64, max_uses: Option<u64>) -> NewPromoCode {
        NewPromoCode {
            uuid: PromoCodeUuid::new(),
            code: code.to_string(),
            description: String::new(),
            discount_type: DiscountKind::Fixed,
            discount_value,
            min_order_amount: 0,
            max_uses,
            valid_from: None,
            valid_until: None,
        }
    }

    #[tokio::test]
    async fn order_bills_only_lines_that_still_exist() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let kept = ctx
            .products
            .create_product(exporter, new_product("Rug", 1_000, 10))
            .await?;
        let deleted = ctx
            .products
            .create_product(exporter, new_product("Cushion", 500, 10))
            .await?;

        add_to_cart(&ctx, buyer, &kept, 1).await?;
        add_to_cart(&ctx, buyer, &deleted, 1).await?;

        ctx.products.delete_product(exporter, deleted.uuid).await?;

        let order = ctx
            .orders
            .create_from_cart(buyer, PaymentReceipt::new("pi_rug"))
            .await?;

        assert_eq!(order.total_amount, 1_000);
        assert_eq!(order.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_promo_code_is_not_redeemed_twice() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let first = ctx.create_buyer("First").await;
        let second = ctx.create_buyer("Second").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Basket", 1_000, 10))
            .await?;

        ctx.promotions
            .create_promo(exporter, promo("ONCE", 500, Some(1)))
            .await?;

        for buyer in [first, second] {
            add_to_cart(&ctx, buyer, &product, 1).await?;
            ctx.carts
                .apply_promo(CartOwner::User(buyer), "ONCE".to_string(), Timestamp::now())
                .await?;
        }

        let redeemed = ctx
            .orders
            .create_from_cart(first, PaymentReceipt::new("pi_first"))
            .await?;
        assert_eq!(redeemed.total_amount, 500);

        let result = ctx
            .orders
            .create_from_cart(second, PaymentReceipt::new("pi_second"))
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::PromoLimitReached)),
            "expected PromoLimitReached, got {result:?}"
        );

        let promos = ctx.promotions.list_promos(exporter).await?;
        assert_eq!(promos.first().map(|promo| promo.current_uses), Some(1));

        let untouched = ctx.carts.get_cart(CartOwner::User(second)).await?;
        assert_eq!(untouched.map(|cart| cart.amount_due()), Some(500));

        let orders = ctx
            .orders
            .list_buyer_orders(second, PageRequest::new(None, None))
            .await?;
        assert_eq!(orders.total_items, 0);

        Ok(())
    }

    #[tokio::test]
    async fn cart_changed_after_payment_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let exporter = ctx.create_exporter("Exporter").await;
        let buyer = ctx.create_buyer("Buyer").await;

        let product = ctx
            .products
            .create_product(exporter, new_product("Jar", 400, 10))
            .await?;

        add_to_cart(&ctx, buyer, &product, 1).await?;

        let paid = ctx
            .carts
            .get_cart(CartOwner::User(buyer))
            .await?
            .ok_or("cart missing")?;
        let receipt = PaymentReceipt::new("pi_jar").for_cart(paid.uuid, paid.amount_due());

        add_to_cart(&ctx, buyer, &product, 2).await?;

        let result = ctx.orders.create_from_cart(buyer, receipt.clone()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::CartChanged)),
            "expected CartChanged, got {result:?}"
        );

        ctx.carts
            .update_quantity(CartOwner::User(buyer), product.uuid, 1)
            .await?;

        let order = ctx.orders.create_from_cart(buyer, receipt).await?;
        assert_eq!(order.total_amount, 400);

        Ok(())
    }
}
