//! Promotion Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::promotions::PromotionsServiceError;

pub(crate) fn into_status_error(error: PromotionsServiceError) -> StatusError {
    match error {
        PromotionsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Promo code already exists")
        }
        PromotionsServiceError::NotFound => {
            StatusError::not_found().brief("Invalid or expired promo code")
        }
        PromotionsServiceError::StillActive => {
            StatusError::conflict().brief("Deactivate the promo code before deleting it")
        }
        error @ (PromotionsServiceError::LimitReached
        | PromotionsServiceError::BelowMinimumOrder { .. }
        | PromotionsServiceError::NoEligibleItems { .. }
        | PromotionsServiceError::MissingRequiredData) => {
            StatusError::bad_request().brief(error.to_string())
        }
        PromotionsServiceError::InvalidData | PromotionsServiceError::AmountOverflow => {
            StatusError::bad_request().brief("Invalid promo code payload")
        }
        PromotionsServiceError::Sql(source) => {
            error!("promo code storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
