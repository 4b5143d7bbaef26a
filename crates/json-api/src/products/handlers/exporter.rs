//! Exporter Products Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use emporium_app::domain::{pagination::PageRequest, products::models::ProductFilter};

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductsPageResponse},
    state::State,
};

/// Exporter Products Handler
///
/// Lists the calling exporter's own products, newest first.
#[endpoint(
    tags("products"),
    summary = "List Own Products",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Exporter products"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    page: QueryParam<u64, false>,
    limit: QueryParam<u64, false>,
    depot: &mut Depot,
) -> Result<Json<ProductsPageResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;

    let products = state
        .app
        .products
        .search_products(
            ProductFilter::for_exporter(exporter),
            PageRequest::new(page.into_inner(), limit.into_inner()),
        )
        .await
        .map_err(into_status_error)?;

    Ok(Json(products.into()))
}
