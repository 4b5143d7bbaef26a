//! Stripe-compatible Checkout Sessions client.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::payments::gateway::{
    CheckoutRequest, CheckoutSession, PaymentGateway, PaymentGatewayError, PaymentStatus,
};

/// Configuration for the payment processor API.
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    /// API base, e.g. `"https://api.stripe.com"`.
    pub api_base: String,

    /// Secret API key sent as a bearer token.
    pub secret_key: Zeroizing<String>,

    /// Three letter ISO currency code, lowercase.
    pub currency: String,
}

/// HTTP client for hosted checkout sessions.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    config: PaymentsConfig,
    http: Client,
}

impl StripeGateway {
    #[must_use]
    pub fn new(config: PaymentsConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/v1/checkout/sessions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

/// Form fields for a session creation request, in the processor's bracket notation.
pub(crate) fn session_form(request: &CheckoutRequest, currency: &str) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (index, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{index}]");

        form.push((
            format!("{prefix}[price_data][currency]"),
            currency.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

async fn parse_session(response: Response, action: &str) -> Result<CheckoutSession, PaymentGatewayError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        return Err(PaymentGatewayError::UnexpectedResponse(format!(
            "{action} request failed with status {status}: {text}"
        )));
    }

    let parsed: SessionResponse = response.json().await?;

    Ok(CheckoutSession {
        id: parsed.id,
        url: parsed.url,
        payment_status: PaymentStatus::from_processor(&parsed.payment_status),
        payment_intent: parsed.payment_intent,
        metadata: parsed.metadata,
    })
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let response = self
            .http
            .post(self.sessions_url())
            .bearer_auth(self.config.secret_key.as_str())
            .form(&session_form(&request, &self.config.currency))
            .send()
            .await?;

        parse_session(response, "create session").await
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let response = self
            .http
            .get(format!("{}/{session_id}", self.sessions_url()))
            .bearer_auth(self.config.secret_key.as_str())
            .send()
            .await?;

        parse_session(response, "retrieve session").await
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
    payment_status: String,
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use crate::payments::gateway::CheckoutLineItem;

    use super::*;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            line_items: vec![
                CheckoutLineItem {
                    name: "Teapot".to_string(),
                    unit_amount: 1_999,
                    quantity: 2,
                },
                CheckoutLineItem {
                    name: "Cup".to_string(),
                    unit_amount: 450,
                    quantity: 4,
                },
            ],
            success_url: "https://shop.test/order-success".to_string(),
            cancel_url: "https://shop.test/cart".to_string(),
            metadata: BTreeMap::from([("cartId".to_string(), "abc".to_string())]),
        }
    }

    fn field<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn form_encodes_line_items_in_order() {
        let form = session_form(&request(), "usd");

        assert_eq!(field(&form, "mode"), Some("payment"));
        assert_eq!(
            field(&form, "line_items[0][price_data][product_data][name]"),
            Some("Teapot")
        );
        assert_eq!(
            field(&form, "line_items[1][price_data][unit_amount]"),
            Some("450")
        );
        assert_eq!(field(&form, "line_items[1][quantity]"), Some("4"));
        assert_eq!(
            field(&form, "line_items[0][price_data][currency]"),
            Some("usd")
        );
    }

    #[test]
    fn form_carries_metadata() {
        let form = session_form(&request(), "usd");

        assert_eq!(field(&form, "metadata[cartId]"), Some("abc"));
    }

    #[test]
    fn session_response_tolerates_missing_metadata() -> Result<(), serde_json::Error> {
        let parsed: SessionResponse = serde_json::from_str(
            r#"{"id":"cs_1","url":null,"payment_status":"unpaid","payment_intent":null}"#,
        )?;

        assert!(parsed.metadata.is_empty());
        assert_eq!(
            PaymentStatus::from_processor(&parsed.payment_status),
            PaymentStatus::Unpaid
        );

        Ok(())
    }
}
