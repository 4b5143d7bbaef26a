//! Checkout

pub mod errors;
pub mod models;
mod service;

pub use errors::CheckoutServiceError;
pub use service::*;
