//! List Exporters Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::ExporterResponse},
};

/// List Exporters Handler
///
/// Public list of exporters, by name.
#[endpoint(
    tags("users"),
    summary = "List Exporters",
    responses(
        (status_code = StatusCode::OK, description = "Exporters"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<ExporterResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let exporters = state
        .app
        .users
        .list_exporters()
        .await
        .map_err(into_status_error)?;

    Ok(Json(exporters.into_iter().map(Into::into).collect()))
}
