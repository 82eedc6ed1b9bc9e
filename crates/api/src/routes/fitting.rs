//! Route definitions for fitting job submission and polling.
//!
//! ```text
//! POST /create                  submit a job, returns id + processing
//! GET  /result/{id}             poll current status
//! GET  /history/{customer_id}   recent records for a customer
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fitting;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(fitting::create_fitting))
        .route("/result/{id}", get(fitting::get_result))
        .route("/history/{customer_id}", get(fitting::history))
}
