//! Create Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use emporium_app::domain::promotions::models::PromoCodeUuid;

use crate::{
    extensions::*,
    promotions::{
        errors::into_status_error,
        models::{CreatePromoRequest, PromoCodeResponse},
    },
    state::State,
};

/// Create Promo Code Handler
///
/// Codes are stored uppercased and only discount the caller's own products.
#[endpoint(
    tags("promotions"),
    summary = "Create Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Promo code created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::CONFLICT, description = "Promo code already exists"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreatePromoRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PromoCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;
    let promo = json.into_inner().into_new_promo(PromoCodeUuid::new())?;

    let promo = state
        .app
        .promotions
        .create_promo(exporter, promo)
        .await
        .map_err(into_status_error)?;

    info!(code = %promo.code, exporter_uuid = %exporter, "created promo code");

    res.status_code(StatusCode::CREATED);

    Ok(Json(promo.into()))
}
