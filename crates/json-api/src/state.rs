//! Shared handler state

use std::sync::Arc;

use emporium_app::context::AppContext;

/// Injected into the depot once and read by every handler.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self { app })
    }
}
