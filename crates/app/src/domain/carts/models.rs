//! Cart Models

use std::fmt;

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    domain::{
        carts::errors::CartsServiceError,
        products::models::ProductUuid,
        promotions::models::{CartLine, PromoQuote},
        users::models::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Longest guest session token accepted.
pub const MAX_GUEST_SESSION_LEN: usize = 128;

/// Opaque token a browser holds to identify its guest cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GuestSessionId(String);

#[derive(Debug, Error)]
#[error("guest session id must be 1 to {MAX_GUEST_SESSION_LEN} characters")]
pub struct InvalidGuestSession;

impl GuestSessionId {
    /// Accept a session token, rejecting blank or oversized values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidGuestSession`] when the token is blank or too long.
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidGuestSession> {
        let value = value.into();

        if value.trim().is_empty() || value.chars().count() > MAX_GUEST_SESSION_LEN {
            return Err(InvalidGuestSession);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    User(UserUuid),
    Guest(GuestSessionId),
}

impl CartOwner {
    #[must_use]
    pub fn user(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Guest(_) => None,
        }
    }

    #[must_use]
    pub fn guest(&self) -> Option<&GuestSessionId> {
        match self {
            Self::User(_) => None,
            Self::Guest(session) => Some(session),
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => write!(f, "user:{user}"),
            Self::Guest(session) => write!(f, "guest:{session}"),
        }
    }
}

/// A cart line: a product with the unit price captured when it was first added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub product: ProductUuid,
    pub quantity: u64,
    pub price: u64,
}

/// A line to add to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub product: ProductUuid,
    pub quantity: u64,
    pub price: u64,
}

/// Promo code currently discounting a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPromo {
    pub code: String,
    pub discount_amount: u64,
    pub exporter: UserUuid,
}

/// Cart Model
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub uuid: CartUuid,
    pub owner: CartOwner,
    pub items: Vec<CartItem>,
    pub total_price: u64,
    pub discount: u64,
    pub applied_promo: Option<AppliedPromo>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Cart {
    /// Add `item`, merging into an existing line for the same product.
    ///
    /// A merged line keeps its original price snapshot.
    pub(crate) fn add_item(&mut self, item: NewCartItem) -> Result<(), CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        if item.price == 0 {
            return Err(CartsServiceError::InvalidPrice);
        }

        match self.line_mut(item.product) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(item.quantity)
                    .ok_or(CartsServiceError::AmountOverflow)?;
            }
            None => self.items.push(CartItem {
                product: item.product,
                quantity: item.quantity,
                price: item.price,
            }),
        }

        self.recompute()
    }

    /// Overwrite a line's quantity. Zero removes the line.
    pub(crate) fn set_quantity(
        &mut self,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(), CartsServiceError> {
        if quantity == 0 {
            if !self.remove_line(product) {
                return Err(CartsServiceError::ItemNotFound);
            }

            return self.recompute();
        }

        let line = self
            .line_mut(product)
            .ok_or(CartsServiceError::ItemNotFound)?;

        line.quantity = quantity;

        self.recompute()
    }

    /// Drop the line for `product`, if any.
    pub(crate) fn remove_item(&mut self, product: ProductUuid) -> Result<(), CartsServiceError> {
        self.remove_line(product);

        self.recompute()
    }

    /// Store a priced promo on the cart.
    pub(crate) fn apply_promo(&mut self, quote: &PromoQuote) {
        self.discount = quote.discount_amount.min(self.total_price);
        self.applied_promo = Some(AppliedPromo {
            code: quote.promo.code.clone(),
            discount_amount: self.discount,
            exporter: quote.promo.exporter,
        });
    }

    /// Recompute the total from the lines.
    ///
    /// Any applied promo was priced against the old lines, so it is dropped.
    pub(crate) fn recompute(&mut self) -> Result<(), CartsServiceError> {
        self.total_price = self
            .items
            .iter()
            .try_fold(0_u64, |total, item| {
                item.quantity
                    .checked_mul(item.price)
                    .and_then(|line_total| total.checked_add(line_total))
            })
            .ok_or(CartsServiceError::AmountOverflow)?;
        self.discount = 0;
        self.applied_promo = None;

        Ok(())
    }

    /// Bring the stored header back in line with the loaded lines.
    ///
    /// Lines disappear without touching the header when their product is
    /// deleted, so a mismatch reprices the cart and drops any promo priced
    /// against the old lines. Returns whether anything changed.
    pub(crate) fn reconcile(&mut self) -> bool {
        let line_sum = self.items.iter().fold(0_u64, |total, item| {
            total.saturating_add(item.quantity.saturating_mul(item.price))
        });

        if line_sum == self.total_price {
            return false;
        }

        self.total_price = line_sum;
        self.discount = 0;
        self.applied_promo = None;

        true
    }

    /// What the customer pays: total less discount.
    #[must_use]
    pub fn amount_due(&self) -> u64 {
        self.total_price.saturating_sub(self.discount)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The lines in the shape the promo engine prices.
    #[must_use]
    pub fn promo_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|item| CartLine {
                product: item.product,
                quantity: item.quantity,
                price: item.price,
            })
            .collect()
    }

    fn line_mut(&mut self, product: ProductUuid) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.product == product)
    }

    fn remove_line(&mut self, product: ProductUuid) -> bool {
        let before = self.items.len();

        self.items.retain(|item| item.product != product);

        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::domain::promotions::models::{DiscountKind, PromoSummary};

    use super::*;

    fn empty_cart() -> Cart {
        let now = Timestamp::now();

        Cart {
            uuid: CartUuid::new(),
            owner: CartOwner::User(UserUuid::new()),
            items: Vec::new(),
            total_price: 0,
            discount: 0,
            applied_promo: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(product: ProductUuid, quantity: u64, price: u64) -> NewCartItem {
        NewCartItem {
            product,
            quantity,
            price,
        }
    }

    fn line_total(cart: &Cart) -> u64 {
        cart.items.iter().map(|item| item.quantity * item.price).sum()
    }

    fn fixed_quote(exporter: UserUuid, amount: u64, eligible: u64) -> PromoQuote {
        PromoQuote {
            promo: PromoSummary {
                code: "FIVE".to_string(),
                description: String::new(),
                discount_type: DiscountKind::Fixed,
                discount_value: amount,
                exporter,
            },
            discount_amount: amount,
            eligible_amount: eligible,
        }
    }

    #[test]
    fn guest_session_rejects_blank_and_oversized_tokens() {
        assert!(GuestSessionId::new("   ").is_err());
        assert!(GuestSessionId::new("x".repeat(MAX_GUEST_SESSION_LEN + 1)).is_err());
        assert!(GuestSessionId::new("session-123").is_ok());
    }

    #[test]
    fn adding_same_product_increments_quantity_and_keeps_price() -> TestResult {
        let product = ProductUuid::new();
        let mut cart = empty_cart();

        cart.add_item(item(product, 1, 1_000))?;
        cart.add_item(item(product, 2, 1_500))?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items.first().map(|line| line.quantity), Some(3));
        assert_eq!(cart.items.first().map(|line| line.price), Some(1_000));
        assert_eq!(cart.total_price, 3_000);

        Ok(())
    }

    #[test]
    fn total_matches_lines_after_every_mutation() -> TestResult {
        let tea = ProductUuid::new();
        let mug = ProductUuid::new();
        let rug = ProductUuid::new();
        let mut cart = empty_cart();

        cart.add_item(item(tea, 2, 450))?;
        assert_eq!(cart.total_price, line_total(&cart));

        cart.add_item(item(mug, 1, 1_299))?;
        assert_eq!(cart.total_price, line_total(&cart));

        cart.add_item(item(rug, 1, 25_000))?;
        assert_eq!(cart.total_price, line_total(&cart));

        cart.set_quantity(tea, 5)?;
        assert_eq!(cart.total_price, line_total(&cart));

        cart.remove_item(rug)?;
        assert_eq!(cart.total_price, line_total(&cart));

        cart.set_quantity(mug, 0)?;
        assert_eq!(cart.total_price, line_total(&cart));
        assert_eq!(cart.total_price, 2_250);

        Ok(())
    }

    #[test]
    fn zero_quantity_or_price_is_rejected() {
        let mut cart = empty_cart();

        assert!(matches!(
            cart.add_item(item(ProductUuid::new(), 0, 100)),
            Err(CartsServiceError::InvalidQuantity)
        ));
        assert!(matches!(
            cart.add_item(item(ProductUuid::new(), 1, 0)),
            Err(CartsServiceError::InvalidPrice)
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn updating_missing_line_is_item_not_found() {
        let mut cart = empty_cart();

        assert!(matches!(
            cart.set_quantity(ProductUuid::new(), 2),
            Err(CartsServiceError::ItemNotFound)
        ));
    }

    #[test]
    fn removing_missing_line_is_a_no_op() -> TestResult {
        let mut cart = empty_cart();
        cart.add_item(item(ProductUuid::new(), 1, 700))?;

        cart.remove_item(ProductUuid::new())?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_price, 700);

        Ok(())
    }

    #[test]
    fn fixed_promo_on_three_items_leaves_twenty_five() -> TestResult {
        let exporter = UserUuid::new();
        let mut cart = empty_cart();

        cart.add_item(item(ProductUuid::new(), 3, 1_000))?;
        cart.apply_promo(&fixed_quote(exporter, 500, 3_000));

        assert_eq!(cart.total_price, 3_000);
        assert_eq!(cart.discount, 500);
        assert_eq!(cart.amount_due(), 2_500);
        assert_eq!(
            cart.applied_promo.as_ref().map(|promo| promo.exporter),
            Some(exporter)
        );

        Ok(())
    }

    #[test]
    fn changing_lines_clears_applied_promo() -> TestResult {
        let product = ProductUuid::new();
        let mut cart = empty_cart();

        cart.add_item(item(product, 3, 1_000))?;
        cart.apply_promo(&fixed_quote(UserUuid::new(), 500, 3_000));
        cart.set_quantity(product, 1)?;

        assert!(cart.applied_promo.is_none());
        assert_eq!(cart.discount, 0);
        assert_eq!(cart.amount_due(), 1_000);

        Ok(())
    }

    #[test]
    fn reconcile_reprices_after_a_line_vanishes() -> TestResult {
        let kept = ProductUuid::new();
        let deleted = ProductUuid::new();
        let mut cart = empty_cart();

        cart.add_item(item(kept, 1, 1_000))?;
        cart.add_item(item(deleted, 1, 500))?;
        cart.apply_promo(&fixed_quote(UserUuid::new(), 200, 1_500));
        cart.items.retain(|line| line.product != deleted);

        assert!(cart.reconcile());
        assert_eq!(cart.total_price, 1_000);
        assert_eq!(cart.discount, 0);
        assert!(cart.applied_promo.is_none());

        Ok(())
    }

    #[test]
    fn reconcile_keeps_a_consistent_cart_and_its_promo() -> TestResult {
        let mut cart = empty_cart();

        cart.add_item(item(ProductUuid::new(), 2, 1_000))?;
        cart.apply_promo(&fixed_quote(UserUuid::new(), 300, 2_000));

        assert!(!cart.reconcile());
        assert_eq!(cart.total_price, 2_000);
        assert_eq!(cart.amount_due(), 1_700);

        Ok(())
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let mut cart = empty_cart();

        let result = cart.add_item(item(ProductUuid::new(), 2, u64::MAX));

        assert!(matches!(result, Err(CartsServiceError::AmountOverflow)));
    }
}
