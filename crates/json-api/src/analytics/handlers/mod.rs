//! Analytics Handlers

pub(crate) mod exporter;
