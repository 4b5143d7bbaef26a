//! Marketplace Domain Concerns

pub mod analytics;
pub mod carts;
pub mod checkout;
pub mod orders;
pub mod pagination;
pub mod products;
pub mod promotions;
pub mod users;
pub mod wishlists;
