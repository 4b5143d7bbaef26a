//! Payment gateway abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

/// One priced line shown on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
    pub name: String,
    pub unit_amount: u64,
    pub quantity: u64,
}

/// Everything needed to open a hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub line_items: Vec<CheckoutLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

/// Payment state the processor reports for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl PaymentStatus {
    #[must_use]
    pub fn from_processor(value: &str) -> Self {
        match value {
            "paid" => Self::Paid,
            "no_payment_required" => Self::NoPaymentRequired,
            _ => Self::Unpaid,
        }
    }
}

/// A checkout session as the processor reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_intent: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// Transport failure or undecodable body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status or a body missing required fields.
    #[error("unexpected response from payment processor: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a hosted checkout session.
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    /// Look up a session by id.
    async fn retrieve_session(&self, session_id: &str)
    -> Result<CheckoutSession, PaymentGatewayError>;
}
