//! Promotions service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromotionsServiceError {
    #[error("promo code already exists")]
    AlreadyExists,

    #[error("invalid or expired promo code")]
    NotFound,

    #[error("promo code usage limit reached")]
    LimitReached,

    #[error("minimum order amount of {minimum} required")]
    BelowMinimumOrder { minimum: u64 },

    #[error("this promo code only applies to products from {exporter_name}")]
    NoEligibleItems { exporter_name: String },

    #[error("promo code and cart items are required")]
    MissingRequiredData,

    #[error("promo code must be deactivated before it is deleted")]
    StillActive,

    #[error("invalid data")]
    InvalidData,

    #[error("discount amount overflowed")]
    AmountOverflow,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PromotionsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::ForeignKeyViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
