//! OpenBao Transit client used to derive and check token verifiers.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Clone)]
pub struct OpenBaoConfig {
    /// Server address, e.g. `"http://localhost:8200"`.
    pub addr: String,

    pub token: Zeroizing<String>,

    /// Transit key used for HMAC operations.
    pub transit_key: String,
}

#[derive(Debug, Clone)]
pub struct OpenBaoClient {
    config: OpenBaoConfig,
    http: Client,
}

impl OpenBaoClient {
    #[must_use]
    pub fn new(config: OpenBaoConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn transit_url(&self, operation: &str) -> String {
        format!(
            "{}/v1/transit/{operation}/{}",
            self.config.addr.trim_end_matches('/'),
            self.config.transit_key
        )
    }

    async fn transit<B, T>(&self, operation: &str, body: &B) -> Result<T, OpenBaoError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.transit_url(operation))
            .header("X-Vault-Token", self.config.token.as_str())
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(OpenBaoError::UnexpectedResponse(format!(
                "{operation} request failed with status {status}: {text}"
            )));
        }

        let envelope: TransitEnvelope<T> = response.json().await?;

        Ok(envelope.data)
    }

    /// HMAC `input` with the transit key, returning the `vault:v1:...` verifier to store.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn hmac(&self, input: &[u8]) -> Result<String, OpenBaoError> {
        let data: HmacData = self
            .transit(
                "hmac",
                &HmacRequest {
                    input: BASE64.encode(input),
                },
            )
            .await?;

        Ok(data.hmac)
    }

    /// Check `input` against a stored verifier.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn verify(&self, input: &[u8], hmac: &str) -> Result<bool, OpenBaoError> {
        let data: VerifyData = self
            .transit(
                "verify",
                &VerifyRequest {
                    input: BASE64.encode(input),
                    hmac,
                },
            )
            .await?;

        Ok(data.valid)
    }
}

#[derive(Debug, Serialize)]
struct HmacRequest {
    input: String,
}

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    input: String,
    hmac: &'a str,
}

#[derive(Debug, Deserialize)]
struct TransitEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct HmacData {
    hmac: String,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    valid: bool,
}

#[derive(Debug, Error)]
pub enum OpenBaoError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from OpenBao: {0}")]
    UnexpectedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(addr: &str) -> OpenBaoClient {
        OpenBaoClient::new(OpenBaoConfig {
            addr: addr.to_string(),
            token: Zeroizing::new("root".to_string()),
            transit_key: "emporium-api-tokens".to_string(),
        })
    }

    #[test]
    fn transit_url_ignores_trailing_slash() {
        assert_eq!(
            client("http://bao:8200/").transit_url("hmac"),
            "http://bao:8200/v1/transit/hmac/emporium-api-tokens"
        );
    }

    #[test]
    fn verify_envelope_decodes() -> Result<(), serde_json::Error> {
        let envelope: TransitEnvelope<VerifyData> =
            serde_json::from_str(r#"{"request_id":"x","data":{"valid":true}}"#)?;

        assert!(envelope.data.valid);

        Ok(())
    }
}
