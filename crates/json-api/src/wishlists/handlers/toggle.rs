//! Toggle Wishlist Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use emporium_app::domain::wishlists::models::WishlistToggle;

use crate::{
    extensions::*,
    state::State,
    wishlists::{
        errors::into_status_error,
        models::{ToggleRequest, ToggleResponse},
    },
};

/// Toggle Wishlist Handler
///
/// Adds the product to the caller's wishlist, or removes it when it is
/// already there.
#[endpoint(
    tags("wishlists"),
    summary = "Toggle Wishlist",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Added to wishlist"),
        (status_code = StatusCode::OK, description = "Removed from wishlist"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ToggleRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ToggleResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let toggle = state
        .app
        .wishlists
        .toggle(user, json.into_inner().product_id.into())
        .await
        .map_err(into_status_error)?;

    if toggle == WishlistToggle::Added {
        res.status_code(StatusCode::CREATED);
    }

    Ok(Json(toggle.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::{
        products::models::ProductUuid, wishlists::WishlistsServiceError,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        buyer_service(mocks, Router::with_path("wishlist/toggle").post(handler))
    }

    #[tokio::test]
    async fn test_first_toggle_adds() -> TestResult {
        let product = ProductUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .wishlists
            .expect_toggle()
            .once()
            .withf(move |user, p| *user == TEST_USER_UUID && *p == product)
            .return_once(|_, _| Ok(WishlistToggle::Added));

        let mut res = TestClient::post("http://example.com/wishlist/toggle")
            .json(&json!({ "productId": product.to_string() }))
            .send(&make_service(mocks))
            .await;

        let body: ToggleResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.status, "added");

        Ok(())
    }

    #[tokio::test]
    async fn test_second_toggle_removes() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .wishlists
            .expect_toggle()
            .once()
            .return_once(|_, _| Ok(WishlistToggle::Removed));

        let mut res = TestClient::post("http://example.com/wishlist/toggle")
            .json(&json!({ "productId": ProductUuid::new().to_string() }))
            .send(&make_service(mocks))
            .await;

        let body: ToggleResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.status, "removed");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_product_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .wishlists
            .expect_toggle()
            .once()
            .return_once(|_, _| Err(WishlistsServiceError::ProductNotFound));

        let res = TestClient::post("http://example.com/wishlist/toggle")
            .json(&json!({ "productId": ProductUuid::new().to_string() }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
