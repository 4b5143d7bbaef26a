//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::carts::CartsServiceError;

use crate::promotions;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart not found"),
        CartsServiceError::ProductNotFound => StatusError::not_found().brief("Product not found"),
        CartsServiceError::ItemNotFound => {
            StatusError::not_found().brief("Product is not in the cart")
        }
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CartsServiceError::InvalidPrice => {
            StatusError::bad_request().brief("Price must be greater than zero")
        }
        CartsServiceError::InvalidGuestSession(_) => {
            StatusError::bad_request().brief("Invalid guest session id")
        }
        CartsServiceError::AmountOverflow | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::Promotion(source) => promotions::errors::into_status_error(source),
        CartsServiceError::Sql(source) => {
            error!("cart storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
