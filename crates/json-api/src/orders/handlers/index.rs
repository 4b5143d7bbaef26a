//! Buyer Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use emporium_app::domain::pagination::PageRequest;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersPageResponse},
    state::State,
};

/// Buyer Orders Handler
///
/// The caller's order history, newest first.
#[endpoint(
    tags("orders"),
    summary = "My Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    page: QueryParam<u64, false>,
    limit: QueryParam<u64, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let orders = state
        .app
        .orders
        .list_buyer_orders(user, PageRequest::new(page.into_inner(), limit.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::{
        orders::models::{ItemStatus, OrderItemUuid, OrderUuid},
        pagination::Page,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service, make_order};

    use super::*;

    #[tokio::test]
    async fn test_my_orders_paginates() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .orders
            .expect_list_buyer_orders()
            .once()
            .withf(|user, page| {
                *user == TEST_USER_UUID && *page == PageRequest::new(Some(2), Some(1))
            })
            .return_once(|_, page| {
                let order = make_order(OrderUuid::new(), OrderItemUuid::new(), ItemStatus::Pending);

                Ok(Page::new(vec![order], page, 3))
            });

        let mut res = TestClient::get("http://example.com/orders/my-orders?page=2&limit=1")
            .send(&buyer_service(
                mocks,
                Router::with_path("orders/my-orders").get(handler),
            ))
            .await;

        let body: OrdersPageResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.current_page, 2);
        assert_eq!(body.total_pages, 3);
        assert_eq!(body.total_orders, 3);
        assert_eq!(
            body.orders.first().map(|order| order.status.as_str()),
            Some("pending")
        );

        Ok(())
    }
}
