//! Repository for the `fitting_records` table.
//!
//! The terminal transitions (`complete`, `fail`) are guarded UPDATEs: the
//! WHERE clause excludes terminal rows, so a record can receive at most one
//! terminal write no matter how the callers race. Both return whether a row
//! was actually transitioned.

use aplfit_core::fitting::FittingStatus;
use aplfit_core::types::DbId;
use sqlx::PgPool;

use crate::models::fitting_record::{CreateFittingRecord, FittingRecord};

const COLUMNS: &str = "\
    id, customer_id, customer_photo_url, customer_photo_key, \
    clothing_item_id, clothing_image_url, status, prompt_text, \
    result_url, result_key, error_message, error_code, \
    rating, feedback, created_at, completed_at";

/// Fitting history page size (most recent records per customer).
const HISTORY_LIMIT: i64 = 50;

/// Provides lifecycle operations for fitting records.
pub struct FittingRecordRepo;

impl FittingRecordRepo {
    /// Insert a new record with the given initial status.
    ///
    /// The orchestrator inserts directly in `processing`; the schema default
    /// `pending` is kept for a possible pre-acceptance queue but is not
    /// written by any current flow.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFittingRecord,
        status: FittingStatus,
    ) -> Result<FittingRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO fitting_records \
                 (customer_id, customer_photo_url, customer_photo_key, \
                  clothing_item_id, clothing_image_url, status, prompt_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FittingRecord>(&query)
            .bind(input.customer_id)
            .bind(&input.customer_photo_url)
            .bind(&input.customer_photo_key)
            .bind(input.clothing_item_id)
            .bind(&input.clothing_image_url)
            .bind(status.as_str())
            .bind(&input.prompt_text)
            .fetch_one(pool)
            .await
    }

    /// Find a record by internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FittingRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fitting_records WHERE id = $1");
        sqlx::query_as::<_, FittingRecord>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent records for one customer.
    pub async fn list_by_customer(
        pool: &PgPool,
        customer_id: DbId,
    ) -> Result<Vec<FittingRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fitting_records \
             WHERE customer_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, FittingRecord>(&query)
            .bind(customer_id)
            .bind(HISTORY_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Transition a record to `completed` with its result reference.
    ///
    /// Returns `false` if the record was already terminal (or missing), in
    /// which case nothing was written.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result_url: &str,
        result_key: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fitting_records \
             SET status = $2, result_url = $3, result_key = $4, completed_at = NOW() \
             WHERE id = $1 AND status NOT IN ('completed', 'failed')",
        )
        .bind(id)
        .bind(FittingStatus::Completed.as_str())
        .bind(result_url)
        .bind(result_key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition a record to `failed` with an error message and code.
    ///
    /// Returns `false` if the record was already terminal (or missing).
    pub async fn fail(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
        error_code: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE fitting_records \
             SET status = $2, error_message = $3, error_code = $4, completed_at = NOW() \
             WHERE id = $1 AND status NOT IN ('completed', 'failed')",
        )
        .bind(id)
        .bind(FittingStatus::Failed.as_str())
        .bind(error_message)
        .bind(error_code)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
