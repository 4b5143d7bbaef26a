//! Add To Cart Handlers

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use emporium_app::domain::carts::models::CartOwner;

use crate::{
    carts::{
        errors::into_status_error,
        handlers::guest_owner,
        models::{AddItemRequest, CartResponse, GuestAddItemRequest},
    },
    extensions::*,
    observability::{MarketEvent, record_event},
    state::State,
};

/// Add To Cart Handler
///
/// Adds a line to the caller's cart, creating the cart on first use. Adding a
/// product already in the cart increments its quantity.
#[endpoint(
    tags("carts"),
    summary = "Add To Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    json: JsonBody<AddItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let cart = state
        .app
        .carts
        .add_item(CartOwner::User(user), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    info!(cart_uuid = %cart.uuid, user_uuid = %user, "added cart item");
    record_event(MarketEvent::CartItemAdded);

    res.status_code(StatusCode::CREATED);

    Ok(Json(cart.into()))
}

/// Guest Add To Cart Handler
#[endpoint(
    tags("carts"),
    summary = "Guest Add To Cart",
    responses(
        (status_code = StatusCode::CREATED, description = "Item added"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    json: JsonBody<GuestAddItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let (session, item) = json.into_inner().into_parts();

    let cart = state
        .app
        .carts
        .add_item(guest_owner(session)?, item)
        .await
        .map_err(into_status_error)?;

    record_event(MarketEvent::CartItemAdded);

    res.status_code(StatusCode::CREATED);

    Ok(Json(cart.into()))
}
