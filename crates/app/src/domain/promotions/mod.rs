//! Promotions

pub mod engine;
pub mod errors;
pub mod models;
pub(crate) mod repository;
pub(crate) mod service;

pub use errors::PromotionsServiceError;
pub use service::*;
