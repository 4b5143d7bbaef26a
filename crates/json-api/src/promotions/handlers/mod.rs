//! Promo Code Handlers

pub(crate) mod create;
pub(crate) mod deactivate;
pub(crate) mod delete;
pub(crate) mod index;
pub(crate) mod validate;
