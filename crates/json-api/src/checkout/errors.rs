//! Checkout Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::checkout::CheckoutServiceError;

use crate::orders;

pub(crate) fn into_status_error(error: CheckoutServiceError) -> StatusError {
    match error {
        CheckoutServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        CheckoutServiceError::ProductNotFound => {
            StatusError::not_found().brief("Cart references a product that no longer exists")
        }
        CheckoutServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Session id is required")
        }
        CheckoutServiceError::PaymentNotCompleted => {
            StatusError::bad_request().brief("Payment not completed")
        }
        CheckoutServiceError::Forbidden => {
            StatusError::forbidden().brief("Checkout session belongs to another user")
        }
        CheckoutServiceError::AmountOverflow => {
            StatusError::bad_request().brief("Cart total is out of range")
        }
        CheckoutServiceError::Gateway(source) => {
            error!("payment processor error: {source}");

            StatusError::bad_gateway().brief("Payment processor unavailable")
        }
        CheckoutServiceError::Orders(source) => orders::errors::into_status_error(source),
        CheckoutServiceError::Sql(source) => {
            error!("checkout storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use emporium_app::{domain::orders::OrdersServiceError, payments::PaymentGatewayError};

    use super::*;

    #[test]
    fn processor_failures_are_bad_gateway() {
        let error = into_status_error(CheckoutServiceError::Gateway(
            PaymentGatewayError::UnexpectedResponse("status 500".to_string()),
        ));

        assert_eq!(error.code, StatusCode::BAD_GATEWAY);
        assert!(!error.brief.contains("status 500"));
    }

    #[test]
    fn order_failures_keep_their_own_status() {
        let error = into_status_error(CheckoutServiceError::Orders(
            OrdersServiceError::AlreadyExists,
        ));

        assert_eq!(error.code, StatusCode::CONFLICT);
    }
}
