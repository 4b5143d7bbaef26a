//! Order Handlers

pub(crate) mod approve;
pub(crate) mod exporter;
pub(crate) mod get;
pub(crate) mod index;
