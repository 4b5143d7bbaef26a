//! Update Cart Quantity Handlers

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use emporium_app::domain::carts::models::CartOwner;

use crate::{
    carts::{
        errors::into_status_error,
        handlers::{guest_owner, user_owner},
        models::{CartResponse, UpdateQuantityRequest},
    },
    extensions::*,
    state::State,
};

async fn update(
    depot: &Depot,
    owner: CartOwner,
    request: UpdateQuantityRequest,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let cart = state
        .app
        .carts
        .update_quantity(owner, request.product_id.into(), request.line_quantity())
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

/// Update Cart Quantity Handler
///
/// Sets the quantity of one line. A quantity of zero or less removes the line.
#[endpoint(
    tags("carts"),
    summary = "Update Cart Quantity",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the caller's cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or line not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    user_id: PathParam<Uuid>,
    json: JsonBody<UpdateQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let owner = user_owner(depot, user_id.into_inner())?;

    update(depot, owner, json.into_inner()).await
}

/// Update Guest Cart Quantity Handler
#[endpoint(
    tags("carts"),
    summary = "Update Guest Cart Quantity",
    responses(
        (status_code = StatusCode::OK, description = "Quantity updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid guest session id"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart or line not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    session_id: PathParam<String>,
    json: JsonBody<UpdateQuantityRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let owner = guest_owner(session_id.into_inner())?;

    update(depot, owner, json.into_inner()).await
}
