//! Bearer-token authentication: token format, OpenBao HMAC verifiers and lookups.

mod errors;
mod models;
pub mod openbao;
mod repository;
mod service;
mod token;

pub use errors::*;
pub use models::{ApiTokenMetadata, Identity, IssuedApiToken};
pub use openbao::{OpenBaoClient, OpenBaoConfig, OpenBaoError};
pub use repository::PgAuthRepository;
pub use service::*;
pub use token::*;
