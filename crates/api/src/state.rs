use std::sync::Arc;

use aplfit_storage::ObjectStore;
use aplfit_synthesis::SynthesisProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Clients are constructed once at process start and injected here; no
/// module-scope singletons. This is cheaply cloneable (inner data is behind
/// `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: aplfit_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Object storage for photos, clothing images, and fitting results.
    pub store: Arc<dyn ObjectStore>,
    /// The external image-synthesis provider.
    pub provider: Arc<dyn SynthesisProvider>,
    /// Plain HTTP client for fetching provider result images.
    pub http: reqwest::Client,
}
