//! Remove Cart Item Handlers

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use emporium_app::domain::{carts::models::CartOwner, products::models::ProductUuid};

use crate::{
    carts::{
        errors::into_status_error,
        handlers::{guest_owner, user_owner},
        models::{CartResponse, RemoveItemRequest},
    },
    extensions::*,
    state::State,
};

async fn remove(
    depot: &Depot,
    owner: CartOwner,
    product: ProductUuid,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let cart = state
        .app
        .carts
        .remove_item(owner, product)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

/// Remove Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the caller's cart"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    user_id: PathParam<Uuid>,
    json: JsonBody<RemoveItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let owner = user_owner(depot, user_id.into_inner())?;

    remove(depot, owner, json.into_inner().product_id.into()).await
}

/// Remove Guest Cart Item Handler
#[endpoint(
    tags("carts"),
    summary = "Remove Guest Cart Item",
    responses(
        (status_code = StatusCode::OK, description = "Item removed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    session_id: PathParam<String>,
    product_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let owner = guest_owner(session_id.into_inner())?;

    remove(depot, owner, product_id.into_inner().into()).await
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::carts::CartsServiceError;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service, make_cart, public_service};

    use super::*;

    #[tokio::test]
    async fn test_remove_item_from_body() -> TestResult {
        let product = ProductUuid::new();
        let kept = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_remove_item()
            .once()
            .withf(move |owner, line| *owner == CartOwner::User(TEST_USER_UUID) && *line == product)
            .return_once(move |owner, _| Ok(make_cart(owner, kept, 1)));

        let mut res = TestClient::delete(format!("http://example.com/cart/{TEST_USER_UUID}/remove"))
            .json(&json!({ "productId": product.to_string() }))
            .send(&buyer_service(
                mocks,
                Router::with_path("cart/{user_id}/remove").delete(user_handler),
            ))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.products.len(), 1);
        assert_eq!(body.total_price, 1_500);

        Ok(())
    }

    #[tokio::test]
    async fn test_guest_remove_item_from_path() -> TestResult {
        let product = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .carts
            .expect_remove_item()
            .once()
            .withf(move |_, line| *line == product)
            .return_once(|_, _| Err(CartsServiceError::NotFound));

        let res = TestClient::delete(format!("http://example.com/cart/guest/guest-42/{product}"))
            .send(&public_service(
                mocks,
                Router::with_path("cart/guest/{session_id}/{product_id}").delete(guest_handler),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
