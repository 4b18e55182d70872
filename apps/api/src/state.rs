use crate::config::Config;
use crate::storage::Storage;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds no request data; the storage handle is the only path to persisted state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub config: Config,
}
