pub mod clothing;
pub mod customers;
pub mod fitting;
pub mod health;
pub mod images;
pub mod sample_clothes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /fitting/create                     submit a fitting job (POST)
/// /fitting/result/{id}                poll a fitting job
/// /fitting/history/{customer_id}      fitting history for one customer
///
/// /customers                          list (GET), create (POST)
/// /customers/{id}                     get one customer
///
/// /clothing                           active uploaded items, with filters
/// /clothing/{id}                      get one item
///
/// /images/upload-customer             customer photo upload (POST, multipart)
/// /images/upload-clothing             clothing image upload (POST, multipart)
///
/// /sample-clothes                     catalog listing with filters
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/fitting", fitting::router())
        .nest("/customers", customers::router())
        .nest("/clothing", clothing::router())
        .nest("/images", images::router())
        .nest("/sample-clothes", sample_clothes::router())
}
