//! Cart Count Handler

use std::sync::Arc;

use salvo::prelude::*;

use emporium_app::domain::carts::models::CartOwner;

use crate::{
    carts::{errors::into_status_error, models::CartCountResponse},
    extensions::*,
    state::State,
};

/// Cart Count Handler
///
/// Number of distinct lines in the caller's cart, zero when they have none.
#[endpoint(
    tags("carts"),
    summary = "Cart Count",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Line count"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartCountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let count = state
        .app
        .carts
        .count_items(CartOwner::User(user))
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartCountResponse { count }))
}
