//! Handlers for the `/customers` resource.

use aplfit_core::error::CoreError;
use aplfit_core::types::DbId;
use aplfit_db::models::customer::{CreateCustomer, CustomerListQuery};
use aplfit_db::repositories::CustomerRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

/// POST /api/customers
///
/// Create a customer from intake data. Returns 201 with the created row.
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<impl IntoResponse> {
    let customer = CustomerRepo::create(&state.pool, &input).await?;

    tracing::info!(customer_id = customer.id, "Customer created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: customer })))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let customer = CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))?;

    Ok(Json(DataResponse { data: customer }))
}

/// GET /api/customers
///
/// Paged customer listing, most recent first.
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<CustomerListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let customers = CustomerRepo::list(&state.pool, &params).await?;
    let total = CustomerRepo::count(&state.pool).await?;

    Ok(Json(PagedResponse {
        data: customers,
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}
