//! Validate Promo Code Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    extensions::*,
    promotions::{
        errors::into_status_error,
        models::{PromoQuoteResponse, ValidatePromoRequest},
    },
    state::State,
};

/// Validate Promo Code Handler
///
/// Prices a code against the submitted cart lines without storing anything.
#[endpoint(
    tags("promotions"),
    summary = "Validate Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo code priced"),
        (status_code = StatusCode::BAD_REQUEST, description = "Promo cannot be applied"),
        (status_code = StatusCode::NOT_FOUND, description = "Invalid or expired promo code"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ValidatePromoRequest>,
    depot: &mut Depot,
) -> Result<Json<PromoQuoteResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    depot.identity_or_401()?;

    let quote = state
        .app
        .promotions
        .validate_promo(
            request.code,
            request.cart_total,
            request.cart_items.into_iter().map(Into::into).collect(),
            Timestamp::now(),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(quote.into()))
}
