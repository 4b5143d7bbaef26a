//! Payments Config

use clap::Args;
use emporium_app::payments;
use zeroize::Zeroizing;

/// Payment processor settings.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Processor API base URL
    #[arg(
        long = "payments-api-base",
        env = "PAYMENTS_API_BASE",
        default_value = "https://api.stripe.com"
    )]
    pub api_base: String,

    /// Processor secret API key
    #[arg(long, env = "PAYMENTS_SECRET_KEY", hide_env_values = true)]
    pub secret_key: String,

    /// ISO currency code charged at checkout
    #[arg(long = "payments-currency", env = "PAYMENTS_CURRENCY", default_value = "usd")]
    pub currency: String,

    /// Storefront base URL used for default checkout redirects
    #[arg(long, env = "FRONTEND_URL")]
    pub frontend_url: String,
}

impl PaymentsConfig {
    /// Split into the processor client settings and the storefront URL.
    pub(crate) fn into_parts(self) -> (payments::PaymentsConfig, String) {
        (
            payments::PaymentsConfig {
                api_base: self.api_base,
                secret_key: Zeroizing::new(self.secret_key),
                currency: self.currency.to_lowercase(),
            },
            self.frontend_url,
        )
    }
}
