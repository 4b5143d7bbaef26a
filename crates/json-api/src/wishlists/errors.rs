//! Wishlist Errors

use salvo::http::StatusError;
use tracing::error;

use emporium_app::domain::wishlists::WishlistsServiceError;

pub(crate) fn into_status_error(error: WishlistsServiceError) -> StatusError {
    match error {
        WishlistsServiceError::ProductNotFound => {
            StatusError::not_found().brief("Product not found")
        }
        WishlistsServiceError::Sql(source) => {
            error!("wishlist storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
