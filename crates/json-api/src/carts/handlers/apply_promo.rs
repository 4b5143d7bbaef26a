//! Apply Promo Handlers

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;
use uuid::Uuid;

use emporium_app::domain::carts::models::CartOwner;

use crate::{
    carts::{
        errors::into_status_error,
        handlers::{guest_owner, user_owner},
        models::{ApplyPromoRequest, PromoAppliedResponse},
    },
    extensions::*,
    observability::{MarketEvent, record_event},
    state::State,
};

async fn apply(
    depot: &Depot,
    owner: CartOwner,
    request: ApplyPromoRequest,
) -> Result<Json<PromoAppliedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let applied = state
        .app
        .carts
        .apply_promo(owner, request.promo_code, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    info!(
        cart_uuid = %applied.cart.uuid,
        code = %applied.quote.promo.code,
        discount = applied.quote.discount_amount,
        "applied promo code"
    );

    record_event(MarketEvent::PromoApplied);

    Ok(Json(applied.into()))
}

/// Apply Promo Handler
///
/// Prices a promo code against the cart and stores the discount. Only lines
/// sold by the code's exporter count towards the discount.
#[endpoint(
    tags("carts"),
    summary = "Apply Promo",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Promo cannot be applied"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the caller's cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or promo code not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    user_id: PathParam<Uuid>,
    json: JsonBody<ApplyPromoRequest>,
    depot: &mut Depot,
) -> Result<Json<PromoAppliedResponse>, StatusError> {
    let owner = user_owner(depot, user_id.into_inner())?;

    apply(depot, owner, json.into_inner()).await
}

/// Apply Guest Promo Handler
#[endpoint(
    tags("carts"),
    summary = "Apply Guest Promo",
    responses(
        (status_code = StatusCode::OK, description = "Promo applied"),
        (status_code = StatusCode::BAD_REQUEST, description = "Promo cannot be applied"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or promo code not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    session_id: PathParam<String>,
    json: JsonBody<ApplyPromoRequest>,
    depot: &mut Depot,
) -> Result<Json<PromoAppliedResponse>, StatusError> {
    let owner = guest_owner(session_id.into_inner())?;

    apply(depot, owner, json.into_inner()).await
}
