//! Handlers for the `/fitting` resource.

use aplfit_core::error::CoreError;
use aplfit_core::types::DbId;
use aplfit_db::repositories::FittingRecordRepo;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::fitting::{self, CreateFittingRequest};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/fitting/create
///
/// Submit a fitting job. Returns immediately with the record id and
/// `processing` status; the synthesis call runs in the background and is
/// observed by polling the result endpoint.
pub async fn create_fitting(
    State(state): State<AppState>,
    Json(request): Json<CreateFittingRequest>,
) -> AppResult<impl IntoResponse> {
    let response = fitting::submit(&state, request).await?;
    Ok(Json(DataResponse { data: response }))
}

/// GET /api/fitting/result/{id}
///
/// Poll a fitting job. Returns the record with whatever status it currently
/// holds; callers distinguish `processing` from the terminal states.
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = FittingRecordRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FittingRecord",
            id,
        }))?;

    Ok(Json(DataResponse { data: record }))
}

/// GET /api/fitting/history/{customer_id}
///
/// Most recent fitting records for one customer.
pub async fn history(
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let records = FittingRecordRepo::list_by_customer(&state.pool, customer_id).await?;
    Ok(Json(DataResponse { data: records }))
}
