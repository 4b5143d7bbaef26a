//! Users

pub mod errors;
pub mod models;
pub(crate) mod repository;
mod service;

pub use errors::UsersServiceError;
pub use service::*;
