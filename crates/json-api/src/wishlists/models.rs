//! Wishlist request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::wishlists::models::WishlistToggle;

use crate::products::models::ProductResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToggleRequest {
    pub product_id: Uuid,
}

/// What a toggle did.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ToggleResponse {
    /// `added` or `removed`
    pub status: String,

    pub message: String,
}

impl From<WishlistToggle> for ToggleResponse {
    fn from(toggle: WishlistToggle) -> Self {
        let message = match toggle {
            WishlistToggle::Added => "Added to wishlist",
            WishlistToggle::Removed => "Removed from wishlist",
        };

        Self {
            status: toggle.as_str().to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WishlistResponse {
    pub products: Vec<ProductResponse>,
}
