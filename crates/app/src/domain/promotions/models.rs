//! Promo Code Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    domain::{products::models::ProductUuid, users::models::UserUuid},
    uuids::TypedUuid,
};

/// Promo Code UUID
pub type PromoCodeUuid = TypedUuid<PromoCode>;

/// How a promo code's value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// Whole percent of the eligible amount.
    Percentage,

    /// Minor currency units, capped at the eligible amount.
    Fixed,
}

impl DiscountKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown discount type: {0}")]
pub struct UnknownDiscountKind(String);

impl FromStr for DiscountKind {
    type Err = UnknownDiscountKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "percentage" => Ok(Self::Percentage),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownDiscountKind(other.to_string())),
        }
    }
}

/// Promo Code Model
#[derive(Debug, Clone, PartialEq)]
pub struct PromoCode {
    pub uuid: PromoCodeUuid,
    pub code: String,
    pub description: String,
    pub exporter: UserUuid,
    pub exporter_name: String,
    pub discount_type: DiscountKind,
    pub discount_value: u64,
    pub min_order_amount: u64,
    pub max_uses: Option<u64>,
    pub current_uses: u64,
    pub valid_from: Timestamp,
    pub valid_until: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PromoCode {
    /// Active and inside its validity window at `now`.
    #[must_use]
    pub fn is_redeemable_at(&self, now: Timestamp) -> bool {
        self.is_active
            && self.valid_from <= now
            && self.valid_until.is_none_or(|until| now <= until)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.current_uses >= max)
    }
}

/// New Promo Code Model
#[derive(Debug, Clone, PartialEq)]
pub struct NewPromoCode {
    pub uuid: PromoCodeUuid,
    pub code: String,
    pub description: String,
    pub discount_type: DiscountKind,
    pub discount_value: u64,
    pub min_order_amount: u64,
    pub max_uses: Option<u64>,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
}

/// A cart line as submitted for promo validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product: ProductUuid,
    pub quantity: u64,
    pub price: u64,
}

/// A cart line attributed to the exporter that sells its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub product: ProductUuid,
    pub exporter: Option<UserUuid>,
    pub quantity: u64,
    pub price: u64,
}

/// The public face of a promo code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoSummary {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountKind,
    pub discount_value: u64,
    pub exporter: UserUuid,
}

impl From<&PromoCode> for PromoSummary {
    fn from(promo: &PromoCode) -> Self {
        Self {
            code: promo.code.clone(),
            description: promo.description.clone(),
            discount_type: promo.discount_type,
            discount_value: promo.discount_value,
            exporter: promo.exporter,
        }
    }
}

/// Result of pricing a promo code against a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoQuote {
    pub promo: PromoSummary,
    pub discount_amount: u64,
    pub eligible_amount: u64,
}

/// Trim and uppercase a code as entered by a customer or exporter.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
