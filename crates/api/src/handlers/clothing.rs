//! Handlers for uploaded clothing items.

use aplfit_core::error::CoreError;
use aplfit_core::types::DbId;
use aplfit_db::models::clothing_item::ClothingListQuery;
use aplfit_db::repositories::ClothingItemRepo;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/clothing
///
/// Active uploaded clothing items, optionally filtered by category and
/// gender, newest first.
pub async fn list_clothing(
    State(state): State<AppState>,
    Query(params): Query<ClothingListQuery>,
) -> AppResult<impl IntoResponse> {
    let items = ClothingItemRepo::list_active(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/clothing/{id}
pub async fn get_clothing(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let item = ClothingItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ClothingItem",
            id,
        }))?;

    Ok(Json(DataResponse { data: item }))
}
