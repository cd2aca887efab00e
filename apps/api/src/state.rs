use std::sync::Arc;

use crate::config::Config;
use crate::source::CatalogStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Current catalog snapshot plus the guarded refresh that replaces it.
    pub catalog: Arc<CatalogStore>,
}
