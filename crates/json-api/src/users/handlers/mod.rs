//! User Handlers

pub(crate) mod exporters;
pub(crate) mod me;
pub(crate) mod profile;
