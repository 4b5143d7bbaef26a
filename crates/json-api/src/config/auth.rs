//! Auth Config

use clap::Args;
use emporium_app::auth::OpenBaoConfig;
use zeroize::Zeroizing;

/// `OpenBao` authentication settings.
#[derive(Debug, Args)]
pub struct AuthConfig {
    /// `OpenBao` server address
    #[arg(long, env = "OPENBAO_ADDR")]
    pub addr: String,

    /// `OpenBao` authentication token
    #[arg(long, env = "OPENBAO_TOKEN", hide_env_values = true)]
    pub token: String,

    /// `OpenBao` Transit key name
    #[arg(long, env = "OPENBAO_TRANSIT_KEY")]
    pub transit_key: String,
}

impl From<AuthConfig> for OpenBaoConfig {
    fn from(config: AuthConfig) -> Self {
        Self {
            addr: config.addr,
            token: Zeroizing::new(config.token),
            transit_key: config.transit_key,
        }
    }
}
