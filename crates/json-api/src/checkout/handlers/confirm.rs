//! Handle Payment Success Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use crate::{
    checkout::{errors::into_status_error, models::PaymentSuccessRequest},
    extensions::*,
    observability::{MarketEvent, record_event},
    orders::models::OrderResponse,
    state::State,
};

/// Handle Payment Success Handler
///
/// Verifies the checkout session was paid by the caller, then turns their cart
/// into an order.
#[endpoint(
    tags("checkout"),
    summary = "Handle Payment Success",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Payment not completed"),
        (status_code = StatusCode::FORBIDDEN, description = "Session belongs to another user"),
        (status_code = StatusCode::CONFLICT, description = "Order already recorded or cart changed after payment"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Payment processor unavailable"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<PaymentSuccessRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let order = state
        .app
        .checkout
        .confirm_payment(user, json.into_inner().session_id)
        .await
        .map_err(into_status_error)?;

    info!(order_uuid = %order.uuid, user_uuid = %user, total = order.total_amount, "created order");
    record_event(MarketEvent::PaymentConfirmed);

    res.status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use emporium_app::domain::{
        checkout::CheckoutServiceError,
        orders::{
            OrdersServiceError,
            models::{ItemStatus, OrderItemUuid, OrderUuid},
        },
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service, make_order};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        buyer_service(
            mocks,
            Router::with_path("cart/handle-payment-success").post(handler),
        )
    }

    #[tokio::test]
    async fn test_paid_session_creates_order() -> TestResult {
        let uuid = OrderUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_confirm_payment()
            .once()
            .withf(|user, session| *user == TEST_USER_UUID && session == "cs_test_1")
            .return_once(move |_, _| Ok(make_order(uuid, OrderItemUuid::new(), ItemStatus::Pending)));

        let mut res = TestClient::post("http://example.com/cart/handle-payment-success")
            .json(&json!({ "sessionId": "cs_test_1" }))
            .send(&make_service(mocks))
            .await;

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.payment_id, "pi_test_1");

        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_session_returns_400() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| Err(CheckoutServiceError::PaymentNotCompleted));

        let res = TestClient::post("http://example.com/cart/handle-payment-success")
            .json(&json!({ "sessionId": "cs_test_1" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_someone_elses_session_returns_403() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| Err(CheckoutServiceError::Forbidden));

        let res = TestClient::post("http://example.com/cart/handle-payment-success")
            .json(&json!({ "sessionId": "cs_test_1" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_cart_changed_after_payment_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .checkout
            .expect_confirm_payment()
            .once()
            .return_once(|_, _| {
                Err(CheckoutServiceError::Orders(OrdersServiceError::CartChanged))
            });

        let res = TestClient::post("http://example.com/cart/handle-payment-success")
            .json(&json!({ "sessionId": "cs_test_1" }))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
