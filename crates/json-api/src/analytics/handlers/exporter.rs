//! Exporter Analytics Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use emporium_app::domain::analytics::models::TimeRange;

use crate::{
    analytics::{errors::into_status_error, models::AnalyticsResponse},
    extensions::*,
    state::State,
};

/// Exporter Analytics Handler
///
/// Catalog, wishlist and order figures for the calling exporter. Order figures
/// cover `timeRange` (`7days`, `30days`, anything else is all time).
#[endpoint(
    tags("analytics"),
    summary = "Exporter Analytics",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Analytics"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<AnalyticsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;
    let time_range = TimeRange::from_query(req.query::<String>("timeRange").as_deref());

    let analytics = state
        .app
        .analytics
        .exporter_analytics(exporter, time_range, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(analytics.into()))
}
