use std::sync::Arc;

use strand_persist::PersistClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The persistence handle is created once at startup and shared; there is no
/// per-request connect step.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<PersistClient>,
}

impl AppState {
    pub fn new(config: Config, persist: Arc<PersistClient>) -> Self {
        Self {
            config: Arc::new(config),
            persist,
        }
    }
}
