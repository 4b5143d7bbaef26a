//! Exporter Orders Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use emporium_app::domain::pagination::PageRequest;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, models::OrdersPageResponse},
    state::State,
};

/// Exporter Orders Handler
///
/// Orders holding lines that await the caller's approval. Each order carries
/// only the caller's pending lines.
#[endpoint(
    tags("orders"),
    summary = "Exporter Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders awaiting approval"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    page: QueryParam<u64, false>,
    limit: QueryParam<u64, false>,
    depot: &mut Depot,
) -> Result<Json<OrdersPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let orders = state
        .app
        .orders
        .list_exporter_orders(exporter, PageRequest::new(page.into_inner(), limit.into_inner()))
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into()))
}
