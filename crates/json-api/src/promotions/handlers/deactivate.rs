//! Deactivate Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    promotions::{errors::into_status_error, models::PromoCodeResponse},
    state::State,
};

/// Deactivate Promo Code Handler
#[endpoint(
    tags("promotions"),
    summary = "Deactivate Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo code deactivated"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::NOT_FOUND, description = "Promo code not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    id: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PromoCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let promo = state
        .app
        .promotions
        .deactivate_promo(exporter, id.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(promo.into()))
}
