//! Route definitions for multipart image uploads.
//!
//! ```text
//! POST /upload-customer     customer photo (multipart)
//! POST /upload-clothing     clothing image + metadata (multipart)
//! ```

use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Body limit slightly above the 10 MB file cap so multipart overhead
/// does not reject an exactly-at-limit file.
const UPLOAD_BODY_LIMIT: usize = 11 * 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload-customer", post(images::upload_customer_photo))
        .route("/upload-clothing", post(images::upload_clothing_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}
