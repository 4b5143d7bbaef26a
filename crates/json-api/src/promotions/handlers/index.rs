//! List Promo Codes Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    promotions::{
        errors::into_status_error,
        models::PromoCodesResponse,
    },
    state::State,
};

/// List Promo Codes Handler
#[endpoint(
    tags("promotions"),
    summary = "List Promo Codes",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's promo codes, newest first"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PromoCodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let promos = state
        .app
        .promotions
        .list_promos(exporter)
        .await
        .map_err(into_status_error)?;

    Ok(Json(PromoCodesResponse {
        promos: promos.into_iter().map(Into::into).collect(),
    }))
}
