//! Analytics service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsServiceError {
    #[error("storage error")]
    Sql(#[from] Error),
}
