//! Create Checkout Session Handlers

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::info;
use uuid::Uuid;

use emporium_app::domain::carts::models::CartOwner;

use crate::{
    carts::handlers::{guest_owner, user_owner},
    checkout::{
        errors::into_status_error,
        models::{CheckoutSessionRequest, CheckoutSessionResponse},
    },
    extensions::*,
    observability::{MarketEvent, record_event},
    state::State,
};

async fn start(
    depot: &Depot,
    owner: CartOwner,
    request: CheckoutSessionRequest,
) -> Result<Json<CheckoutSessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let started = state
        .app
        .checkout
        .create_checkout_session(owner.clone(), request.into())
        .await
        .map_err(into_status_error)?;

    info!(session_id = %started.session_id, owner = %owner, "started checkout session");
    record_event(MarketEvent::CheckoutStarted);

    Ok(Json(started.into()))
}

/// Create Checkout Session Handler
///
/// Opens a payment processor session for the caller's cart.
#[endpoint(
    tags("checkout"),
    summary = "Create Checkout Session",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Checkout session started"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the caller's cart"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment processor unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn user_handler(
    user_id: PathParam<Uuid>,
    json: JsonBody<CheckoutSessionRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutSessionResponse>, StatusError> {
    let owner = user_owner(depot, user_id.into_inner())?;

    start(depot, owner, json.into_inner()).await
}

/// Create Guest Checkout Session Handler
#[endpoint(
    tags("checkout"),
    summary = "Create Guest Checkout Session",
    responses(
        (status_code = StatusCode::OK, description = "Checkout session started"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment processor unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn guest_handler(
    session_id: PathParam<String>,
    json: JsonBody<CheckoutSessionRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutSessionResponse>, StatusError> {
    let owner = guest_owner(session_id.into_inner())?;

    start(depot, owner, json.into_inner()).await
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::{
        domain::checkout::{CheckoutServiceError, models::StartedCheckout},
        payments::PaymentGatewayError,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service, public_service};

    use super::*;

    fn user_service(mocks: Mocks) -> Service {
        buyer_service(
            mocks,
            Router::with_path("cart/{user_id}/create-checkout-session").post(user_handler),
        )
    }

    fn guest_service(mocks: Mocks) -> Service {
        public_service(
            mocks,
            Router::with_path("cart/guest/{session_id}/create-checkout-session")
                .post(guest_handler),
        )
    }

    #[tokio::test]
    async fn test_user_checkout_returns_session() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_create_checkout_session()
            .once()
            .withf(|owner, urls| {
                *owner == CartOwner::User(TEST_USER_UUID)
                    && urls.success_url.as_deref() == Some("https://shop.test/done")
                    && urls.cancel_url.is_none()
            })
            .return_once(|_, _| {
                Ok(StartedCheckout {
                    session_id: "cs_test_1".to_string(),
                    url: Some("https://pay.test/cs_test_1".to_string()),
                })
            });

        let mut res = TestClient::post(format!(
            "http://example.com/cart/{TEST_USER_UUID}/create-checkout-session"
        ))
        .json(&json!({ "successUrl": "https://shop.test/done" }))
        .send(&user_service(mocks))
        .await;

        let body: CheckoutSessionResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.session_id, "cs_test_1");
        assert_eq!(body.url.as_deref(), Some("https://pay.test/cs_test_1"));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_guest_cart_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_create_checkout_session()
            .once()
            .return_once(|_, _| Err(CheckoutServiceError::EmptyCart));

        let res = TestClient::post("http://example.com/cart/guest/guest-42/create-checkout-session")
            .json(&json!({}))
            .send(&guest_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_processor_failure_returns_502() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_create_checkout_session()
            .once()
            .return_once(|_, _| {
                Err(CheckoutServiceError::Gateway(
                    PaymentGatewayError::UnexpectedResponse("status 503".to_string()),
                ))
            });

        let res = TestClient::post("http://example.com/cart/guest/guest-42/create-checkout-session")
            .json(&json!({}))
            .send(&guest_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));

        Ok(())
    }
}
