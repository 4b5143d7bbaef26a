//! Checkout service errors.

use sqlx::Error;
use thiserror::Error;

use crate::{domain::orders::OrdersServiceError, payments::PaymentGatewayError};

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("user not found")]
    UserNotFound,

    #[error("cart references a product that no longer exists")]
    ProductNotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("payment not completed")]
    PaymentNotCompleted,

    #[error("checkout session belongs to another user")]
    Forbidden,

    #[error("amount overflow")]
    AmountOverflow,

    #[error(transparent)]
    Gateway(#[from] PaymentGatewayError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error("storage error")]
    Sql(#[from] Error),
}
