//! Carts

pub mod errors;
pub mod models;
pub(crate) mod repositories;
mod service;

pub use errors::CartsServiceError;
pub use service::*;
