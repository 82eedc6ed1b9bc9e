//! Route definitions for the sample clothing catalog.
//!
//! ```text
//! GET /     list catalog entries with optional filters
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::sample_clothes;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(sample_clothes::list_sample_clothes))
}
