//! Checkout service.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        carts::{
            models::CartOwner,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        checkout::{
            errors::CheckoutServiceError,
            models::{
                CheckoutUrls, StartedCheckout, USER_ID_KEY, checkout_request, receipt_from_metadata,
            },
        },
        orders::{OrdersService, models::Order},
        products::{models::ProductUuid, repository::PgProductsRepository},
        users::{models::UserUuid, repository::PgUsersRepository},
    },
    payments::{PaymentGateway, PaymentGatewayError, PaymentStatus},
};

#[derive(Clone)]
pub struct PgCheckoutService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    users_repository: PgUsersRepository,
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<dyn OrdersService>,
    frontend_url: String,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(
        db: Db,
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<dyn OrdersService>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            users_repository: PgUsersRepository::new(),
            gateway,
            orders,
            frontend_url: frontend_url.into(),
        }
    }
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    async fn create_checkout_session(
        &self,
        owner: CartOwner,
        urls: CheckoutUrls,
    ) -> Result<StartedCheckout, CheckoutServiceError> {
        let mut tx = self.db.begin().await?;

        if let Some(user) = owner.user() {
            self.users_repository
                .find_user(&mut tx, user)
                .await?
                .ok_or(CheckoutServiceError::UserNotFound)?;
        }

        let mut cart = self
            .carts_repository
            .find_cart(&mut tx, &owner)
            .await?
            .ok_or(CheckoutServiceError::EmptyCart)?;

        cart.items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        cart.reconcile();

        let products: Vec<ProductUuid> = cart.items.iter().map(|item| item.product).collect();
        let catalog = self
            .products_repository
            .find_line_products(&mut tx, &products)
            .await?;

        tx.commit().await?;

        let (success_url, cancel_url) = urls.resolve(&self.frontend_url);
        let request = checkout_request(&cart, &catalog, success_url, cancel_url)?;

        let session = self.gateway.create_checkout_session(request).await?;

        info!(
            owner = %owner,
            cart = %cart.uuid,
            session = %session.id,
            amount = cart.amount_due(),
            "checkout session created"
        );

        Ok(StartedCheckout {
            session_id: session.id,
            url: session.url,
        })
    }

    async fn confirm_payment(
        &self,
        user: UserUuid,
        session_id: String,
    ) -> Result<Order, CheckoutServiceError> {
        if session_id.trim().is_empty() {
            return Err(CheckoutServiceError::MissingRequiredData);
        }

        let session = self.gateway.retrieve_session(&session_id).await?;

        if session.payment_status != PaymentStatus::Paid {
            return Err(CheckoutServiceError::PaymentNotCompleted);
        }

        let paying_user = session.metadata.get(USER_ID_KEY).map(String::as_str);

        if paying_user != Some(user.to_string().as_str()) {
            warn!(
                user = %user,
                session = %session.id,
                paying_user = ?paying_user,
                "payment confirmation for another user's session"
            );

            return Err(CheckoutServiceError::Forbidden);
        }

        let payment_id = session.payment_intent.ok_or_else(|| {
            PaymentGatewayError::UnexpectedResponse(format!(
                "paid session {} has no payment intent",
                session.id
            ))
        })?;

        let receipt = receipt_from_metadata(payment_id, &session.metadata)?;

        let order = self.orders.create_from_cart(user, receipt).await?;

        Ok(order)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Open a processor checkout session for the owner's cart.
    async fn create_checkout_session(
        &self,
        owner: CartOwner,
        urls: CheckoutUrls,
    ) -> Result<StartedCheckout, CheckoutServiceError>;

    /// Verify a paid session belongs to `user`, then turn their cart into an order.
    ///
    /// The cart must still be the one the session charged for.
    async fn confirm_payment(
        &self,
        user: UserUuid,
        session_id: String,
    ) -> Result<Order, CheckoutServiceError>;
}
