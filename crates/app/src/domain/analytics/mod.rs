//! Exporter Analytics

pub mod errors;
pub mod models;
pub(crate) mod repository;
mod service;

pub use errors::AnalyticsServiceError;
pub use service::*;
