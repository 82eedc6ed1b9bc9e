//! Route definitions for the customers resource.
//!
//! ```text
//! GET  /           paged listing
//! POST /           create from intake data
//! GET  /{id}       fetch one customer
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::customers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/{id}", get(customers::get_customer))
}
