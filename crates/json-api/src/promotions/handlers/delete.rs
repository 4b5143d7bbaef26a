//! Delete Promo Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{extensions::*, promotions::errors::into_status_error, state::State};

/// Delete Promo Code Handler
///
/// Only a deactivated code can be deleted.
#[endpoint(
    tags("promotions"),
    summary = "Delete Promo Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Promo code deleted"),
        (status_code = StatusCode::FORBIDDEN, description = "Exporter access required"),
        (status_code = StatusCode::NOT_FOUND, description = "Promo code not found"),
        (status_code = StatusCode::CONFLICT, description = "Promo code is still active"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(id: PathParam<Uuid>, depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let exporter = depot.seller_or_403()?;
    let id = id.into_inner();

    state
        .app
        .promotions
        .delete_promo(exporter, id.into())
        .await
        .map_err(into_status_error)?;

    info!(promo_uuid = %id, exporter_uuid = %exporter, "deleted promo code");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;
    use testresult::TestResult;

    use emporium_app::domain::promotions::{PromotionsServiceError, models::PromoCodeUuid};

    use crate::test_helpers::{Mocks, TEST_EXPORTER_UUID, exporter_service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        exporter_service(mocks, Router::with_path("promo/{id}/delete").put(handler))
    }

    #[tokio::test]
    async fn test_delete_inactive_promo() -> TestResult {
        let uuid = PromoCodeUuid::new();
        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_delete_promo()
            .once()
            .withf(move |exporter, promo| *exporter == TEST_EXPORTER_UUID && *promo == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::put(format!("http://example.com/promo/{uuid}/delete"))
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_active_promo_returns_409() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .promotions
            .expect_delete_promo()
            .once()
            .return_once(|_, _| Err(PromotionsServiceError::StillActive));

        let res = TestClient::put(format!(
            "http://example.com/promo/{}/delete",
            PromoCodeUuid::new()
        ))
        .send(&make_service(mocks))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
