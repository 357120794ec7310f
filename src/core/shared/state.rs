use crate::core::config::AppConfig;
use crate::core::shared::clock::Clock;
use crate::store::ActivityStore;
use std::sync::Arc;

/// Shared per-process state handed to every handler. Holds no mutable data.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn ActivityStore>,
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
