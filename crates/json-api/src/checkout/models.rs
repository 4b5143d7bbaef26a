//! Checkout request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use emporium_app::domain::checkout::models::{CheckoutUrls, StartedCheckout};

/// Redirect targets. Omitted URLs fall back to the storefront pages.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutSessionRequest {
    #[serde(default)]
    pub success_url: Option<String>,

    #[serde(default)]
    pub cancel_url: Option<String>,
}

impl From<CheckoutSessionRequest> for CheckoutUrls {
    fn from(request: CheckoutSessionRequest) -> Self {
        Self {
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        }
    }
}

/// Where to send the buyer to pay.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutSessionResponse {
    pub session_id: String,
    pub url: Option<String>,
}

impl From<StartedCheckout> for CheckoutSessionResponse {
    fn from(started: StartedCheckout) -> Self {
        Self {
            session_id: started.session_id,
            url: started.url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentSuccessRequest {
    pub session_id: String,
}
