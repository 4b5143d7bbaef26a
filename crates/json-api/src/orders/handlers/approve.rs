//! Approve Order Line Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::{MarketEvent, record_event},
    orders::{errors::into_status_error, models::ApprovalResponse},
    state::State,
};

/// Approve Order Line Handler
///
/// Approves one of the caller's pending lines and takes its quantity out of
/// stock. A line that is no longer pending answers 404, so a repeated
/// approval never takes stock twice.
#[endpoint(
    tags("orders"),
    summary = "Approve Order Line",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Line approved"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::NOT_FOUND, description = "Order line not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order_id: PathParam<Uuid>,
    item_id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ApprovalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let approval = state
        .app
        .orders
        .approve_item(
            exporter,
            order_id.into_inner().into(),
            item_id.into_inner().into(),
            Timestamp::now(),
        )
        .await
        .map_err(into_status_error)?;

    info!(
        order_uuid = %approval.order.uuid,
        item_uuid = %approval.item.uuid,
        new_stock = approval.new_stock,
        "approved order line"
    );

    record_event(MarketEvent::LineApproved);

    Ok(Json(approval.into()))
}
