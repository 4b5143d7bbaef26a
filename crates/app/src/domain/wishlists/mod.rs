//! Wishlists

pub mod errors;
pub mod models;
pub(crate) mod repository;
mod service;

pub use errors::WishlistsServiceError;
pub use service::*;
