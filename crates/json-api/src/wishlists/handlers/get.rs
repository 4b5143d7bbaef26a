//! Get Wishlist Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    wishlists::{errors::into_status_error, models::WishlistResponse},
};

/// Get Wishlist Handler
#[endpoint(
    tags("wishlists"),
    summary = "Get Wishlist",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Wishlisted products"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<WishlistResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let products = state
        .app
        .wishlists
        .get_wishlist(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(WishlistResponse {
        products: products.into_iter().map(Into::into).collect(),
    }))
}
