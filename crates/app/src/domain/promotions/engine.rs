//! Promo pricing.
//!
//! Pure functions that decide whether a promo code applies to a set of cart lines
//! and how much it takes off. Storage lookups happen in the service; this module
//! only sees the promo and the already-attributed lines.

use jiff::Timestamp;

use crate::domain::promotions::{
    errors::PromotionsServiceError,
    models::{DiscountKind, PricedLine, PromoCode, PromoQuote, PromoSummary},
};

/// Price `promo` against a cart with the given `subtotal` and `lines`.
///
/// # Errors
///
/// - [`PromotionsServiceError::NotFound`] when the promo is inactive or outside its window.
/// - [`PromotionsServiceError::LimitReached`] when the usage limit is used up.
/// - [`PromotionsServiceError::BelowMinimumOrder`] when `subtotal` is under the minimum.
/// - [`PromotionsServiceError::NoEligibleItems`] when no line belongs to the promo's exporter.
pub fn quote(
    promo: &PromoCode,
    subtotal: u64,
    lines: &[PricedLine],
    now: Timestamp,
) -> Result<PromoQuote, PromotionsServiceError> {
    if !promo.is_redeemable_at(now) {
        return Err(PromotionsServiceError::NotFound);
    }

    if promo.is_exhausted() {
        return Err(PromotionsServiceError::LimitReached);
    }

    if subtotal < promo.min_order_amount {
        return Err(PromotionsServiceError::BelowMinimumOrder {
            minimum: promo.min_order_amount,
        });
    }

    let eligible_amount = eligible_amount(promo, lines)?;

    if eligible_amount == 0 {
        return Err(PromotionsServiceError::NoEligibleItems {
            exporter_name: promo.exporter_name.clone(),
        });
    }

    Ok(PromoQuote {
        promo: PromoSummary::from(promo),
        discount_amount: discount_for(promo.discount_type, promo.discount_value, eligible_amount),
        eligible_amount,
    })
}

/// Sum of `quantity × price` over lines sold by the promo's exporter.
fn eligible_amount(promo: &PromoCode, lines: &[PricedLine]) -> Result<u64, PromotionsServiceError> {
    lines
        .iter()
        .filter(|line| line.exporter == Some(promo.exporter))
        .try_fold(0_u64, |total, line| {
            line.quantity
                .checked_mul(line.price)
                .and_then(|line_total| total.checked_add(line_total))
        })
        .ok_or(PromotionsServiceError::AmountOverflow)
}

/// Discount for `eligible` minor units. Never exceeds `eligible`.
///
/// Percentages are rounded half-up to the nearest minor unit.
#[must_use]
pub fn discount_for(kind: DiscountKind, value: u64, eligible: u64) -> u64 {
    match kind {
        DiscountKind::Percentage => {
            let scaled = (u128::from(eligible) * u128::from(value) + 50) / 100;

            u64::try_from(scaled).unwrap_or(u64::MAX).min(eligible)
        }
        DiscountKind::Fixed => value.min(eligible),
    }
}
