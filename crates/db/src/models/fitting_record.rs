//! Fitting record entity and DTOs.
//!
//! The only entity whose lifecycle is driven by asynchronous work rather
//! than direct user action. Status semantics live in
//! [`aplfit_core::fitting::FittingStatus`].

use aplfit_core::error::CoreError;
use aplfit_core::fitting::FittingStatus;
use aplfit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `fitting_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FittingRecord {
    pub id: DbId,
    pub customer_id: DbId,

    pub customer_photo_url: String,
    pub customer_photo_key: Option<String>,

    pub clothing_item_id: Option<DbId>,
    pub clothing_image_url: Option<String>,

    pub status: String,
    pub prompt_text: Option<String>,

    pub result_url: Option<String>,
    pub result_key: Option<String>,

    pub error_message: Option<String>,
    pub error_code: Option<String>,

    pub rating: Option<i16>,
    pub feedback: Option<String>,

    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl FittingRecord {
    /// Parse the stored status text into the typed state.
    pub fn fitting_status(&self) -> Result<FittingStatus, CoreError> {
        self.status.parse()
    }
}

/// DTO for inserting a fitting record at submission time.
///
/// Exactly one of `clothing_item_id` / `clothing_image_url` may be absent;
/// the database CHECK rejects rows missing both.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFittingRecord {
    pub customer_id: DbId,
    pub customer_photo_url: String,
    pub customer_photo_key: Option<String>,
    pub clothing_item_id: Option<DbId>,
    pub clothing_image_url: Option<String>,
    pub prompt_text: Option<String>,
}
