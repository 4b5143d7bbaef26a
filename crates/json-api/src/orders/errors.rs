//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::orders::OrdersServiceError;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        OrdersServiceError::ProductNotFound => {
            StatusError::not_found().brief("Product not found")
        }
        OrdersServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        error @ OrdersServiceError::InsufficientStock { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::CartChanged => {
            StatusError::conflict().brief("Cart changed after payment")
        }
        OrdersServiceError::PromoLimitReached => {
            StatusError::bad_request().brief("Promo code usage limit reached")
        }
        OrdersServiceError::AlreadyExists => {
            StatusError::conflict().brief("Order already recorded for this payment")
        }
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn insufficient_stock_is_a_conflict_naming_both_amounts() {
        let error = into_status_error(OrdersServiceError::InsufficientStock {
            requested: 5,
            available: 3,
        });

        assert_eq!(error.code, StatusCode::CONFLICT);
        assert!(error.brief.contains("requested 5"));
        assert!(error.brief.contains("available 3"));
    }

    #[test]
    fn cart_changed_after_payment_is_a_conflict() {
        let error = into_status_error(OrdersServiceError::CartChanged);

        assert_eq!(error.code, StatusCode::CONFLICT);
    }

    #[test]
    fn exhausted_promo_at_redemption_is_a_bad_request() {
        let error = into_status_error(OrdersServiceError::PromoLimitReached);

        assert_eq!(error.code, StatusCode::BAD_REQUEST);
        assert_eq!(error.brief, "Promo code usage limit reached");
    }
}
