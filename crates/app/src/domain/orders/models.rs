//! Order Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    domain::{
        carts::models::{Cart, CartUuid},
        products::models::ProductUuid,
        users::models::UserUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItem>;

#[derive(Debug, Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(String);

/// Aggregate status of an order, derived from its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    PartiallyApproved,
    Approved,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyApproved => "partially_approved",
            Self::Approved => "approved",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "partially_approved" => Ok(Self::PartiallyApproved),
            "approved" => Ok(Self::Approved),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Approval state of a single order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Approved,
    Rejected,
}

impl ItemStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Order status implied by the line statuses.
///
/// Every line approved gives `Approved`, some approved gives `PartiallyApproved`,
/// anything else keeps `current`. Rejected lines never move the order.
#[must_use]
pub fn derive_status(current: OrderStatus, items: &[ItemStatus]) -> OrderStatus {
    let approved = items
        .iter()
        .filter(|status| **status == ItemStatus::Approved)
        .count();

    match approved {
        0 => current,
        n if n == items.len() => OrderStatus::Approved,
        _ => OrderStatus::PartiallyApproved,
    }
}

/// OrderItem Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub uuid: OrderItemUuid,
    pub product: ProductUuid,
    pub exporter: UserUuid,
    pub quantity: u64,
    pub price: u64,
    pub status: ItemStatus,
    pub approved_at: Option<Timestamp>,
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub items: Vec<OrderItem>,
    pub total_amount: u64,
    pub payment_id: String,
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of approving one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub order: Order,
    pub item: OrderItem,
    pub product: ProductUuid,
    pub new_stock: u64,
}

/// A captured payment and what the processor recorded about the cart it paid for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment_id: String,
    pub cart: Option<CartUuid>,
    pub amount_paid: Option<u64>,
}

impl PaymentReceipt {
    #[must_use]
    pub fn new(payment_id: impl Into<String>) -> Self {
        Self {
            payment_id: payment_id.into(),
            cart: None,
            amount_paid: None,
        }
    }

    /// Require the order to come from `cart` and to bill exactly `amount_paid`.
    #[must_use]
    pub fn for_cart(mut self, cart: CartUuid, amount_paid: u64) -> Self {
        self.cart = Some(cart);
        self.amount_paid = Some(amount_paid);
        self
    }

    /// Whether `cart` is still the cart that was paid for. Unrecorded fields are not checked.
    #[must_use]
    pub fn matches(&self, cart: &Cart) -> bool {
        self.cart.is_none_or(|paid| paid == cart.uuid)
            && self.amount_paid.is_none_or(|paid| paid == cart.amount_due())
    }
}
