//! Promo code request and response bodies.

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::promotions::models::{
    CartLine, DiscountKind, NewPromoCode, PromoCode, PromoCodeUuid, PromoQuote, PromoSummary,
};

use crate::extensions::*;

/// How a discount value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DiscountType {
    /// Whole percent of the eligible amount
    Percentage,

    /// Minor currency units off the eligible amount
    Fixed,
}

impl From<DiscountType> for DiscountKind {
    fn from(value: DiscountType) -> Self {
        match value {
            DiscountType::Percentage => Self::Percentage,
            DiscountType::Fixed => Self::Fixed,
        }
    }
}

impl From<DiscountKind> for DiscountType {
    fn from(value: DiscountKind) -> Self {
        match value {
            DiscountKind::Percentage => Self::Percentage,
            DiscountKind::Fixed => Self::Fixed,
        }
    }
}

/// A promo code as its exporter sees it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromoCodeResponse {
    pub uuid: Uuid,
    pub code: String,
    pub description: String,
    pub exporter_id: Uuid,
    pub exporter_name: String,
    pub discount_type: DiscountType,
    pub discount_value: u64,
    pub min_order_amount: u64,
    pub max_uses: Option<u64>,
    pub current_uses: u64,
    pub valid_from: String,
    pub valid_until: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PromoCode> for PromoCodeResponse {
    fn from(promo: PromoCode) -> Self {
        Self {
            uuid: promo.uuid.into(),
            code: promo.code,
            description: promo.description,
            exporter_id: promo.exporter.into(),
            exporter_name: promo.exporter_name,
            discount_type: promo.discount_type.into(),
            discount_value: promo.discount_value,
            min_order_amount: promo.min_order_amount,
            max_uses: promo.max_uses,
            current_uses: promo.current_uses,
            valid_from: promo.valid_from.to_string(),
            valid_until: promo.valid_until.map(|until| until.to_string()),
            is_active: promo.is_active,
            created_at: promo.created_at.to_string(),
            updated_at: promo.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromoCodesResponse {
    pub promos: Vec<PromoCodeResponse>,
}

/// New promo code. Validity bounds are RFC 3339 timestamps.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePromoRequest {
    pub code: String,

    #[serde(default)]
    pub description: String,

    pub discount_type: DiscountType,
    pub discount_value: u64,

    #[serde(default)]
    pub min_order_amount: u64,

    #[serde(default)]
    pub max_uses: Option<u64>,

    #[serde(default)]
    pub valid_from: Option<String>,

    #[serde(default)]
    pub valid_until: Option<String>,
}

fn parse_timestamp(value: Option<String>, field: &str) -> Result<Option<Timestamp>, StatusError> {
    value
        .map(|raw| raw.parse::<Timestamp>())
        .transpose()
        .or_400(&format!("{field} must be an RFC 3339 timestamp"))
}

impl CreatePromoRequest {
    pub(crate) fn into_new_promo(self, uuid: PromoCodeUuid) -> Result<NewPromoCode, StatusError> {
        Ok(NewPromoCode {
            uuid,
            code: self.code,
            description: self.description,
            discount_type: self.discount_type.into(),
            discount_value: self.discount_value,
            min_order_amount: self.min_order_amount,
            max_uses: self.max_uses,
            valid_from: parse_timestamp(self.valid_from, "validFrom")?,
            valid_until: parse_timestamp(self.valid_until, "validUntil")?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CartLineRequest {
    pub product: Uuid,
    pub quantity: u64,
    pub price: u64,
}

impl From<CartLineRequest> for CartLine {
    fn from(line: CartLineRequest) -> Self {
        Self {
            product: line.product.into(),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Price a code against cart lines without applying it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidatePromoRequest {
    pub code: String,
    pub cart_total: u64,

    #[serde(default)]
    pub cart_items: Vec<CartLineRequest>,
}

/// The redeemable part of a promo code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromoSummaryResponse {
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: u64,
    pub exporter_id: Uuid,
}

impl From<PromoSummary> for PromoSummaryResponse {
    fn from(promo: PromoSummary) -> Self {
        Self {
            code: promo.code,
            description: promo.description,
            discount_type: promo.discount_type.into(),
            discount_value: promo.discount_value,
            exporter_id: promo.exporter.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromoQuoteResponse {
    pub promo: PromoSummaryResponse,
    pub discount_amount: u64,

    /// Subtotal of the lines sold by the code's exporter
    pub eligible_amount: u64,
}

impl From<PromoQuote> for PromoQuoteResponse {
    fn from(quote: PromoQuote) -> Self {
        Self {
            promo: quote.promo.into(),
            discount_amount: quote.discount_amount,
            eligible_amount: quote.eligible_amount,
        }
    }
}
