//! Analytics Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::analytics::AnalyticsServiceError;

pub(crate) fn into_status_error(error: AnalyticsServiceError) -> StatusError {
    match error {
        AnalyticsServiceError::Sql(source) => {
            error!("analytics storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
