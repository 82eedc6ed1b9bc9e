//! Route definitions for uploaded clothing items.
//!
//! ```text
//! GET /           active items, optional category/gender filters
//! GET /{id}       fetch one item
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::clothing;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(clothing::list_clothing))
        .route("/{id}", get(clothing::get_clothing))
}
