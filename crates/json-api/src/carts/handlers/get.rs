//! Get Cart Handlers

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::{
        errors::into_status_error,
        handlers::{guest_owner, user_owner},
        models::CartResponse,
    },
    extensions::*,
    state::State,
};

/// Get Cart Handler
#[endpoint(
    tags("carts"),
    summary = "Get Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart, empty when none exists"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the caller's cart"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    user_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let owner = user_owner(depot, user_id.into_inner())?;

    let cart = state
        .app
        .carts
        .get_cart(owner)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

/// Get Guest Cart Handler
#[endpoint(
    tags("carts"),
    summary = "Get Guest Cart",
    responses(
        (status_code = StatusCode::OK, description = "Cart, empty when none exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid guest session id"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    session_id: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let cart = state
        .app
        .carts
        .get_cart(guest_owner(session_id.into_inner())?)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}
