//! Customer entity and DTOs.

use aplfit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: String,

    pub photo_front_url: Option<String>,
    pub photo_front_key: Option<String>,
    pub photo_front_filename: Option<String>,
    pub photo_side_url: Option<String>,
    pub photo_side_key: Option<String>,
    pub photo_side_filename: Option<String>,
    pub photo_angle_url: Option<String>,
    pub photo_angle_key: Option<String>,
    pub photo_angle_filename: Option<String>,

    pub body_shape: Option<String>,
    pub height_bucket: Option<String>,
    pub weight_bucket: Option<String>,
    pub prompt_text: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/customers` and for lazy creation during fitting
/// submission. A missing name gets a generated placeholder at insert time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCustomer {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub body_shape: Option<String>,
    pub height_bucket: Option<String>,
    pub weight_bucket: Option<String>,
    pub photo_front_url: Option<String>,
    pub photo_front_key: Option<String>,
    pub photo_front_filename: Option<String>,
}

/// Which of the three photo slots an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Front,
    Side,
    Angle,
}

impl PhotoSlot {
    /// Column prefix for this slot (`photo_front`, `photo_side`, `photo_angle`).
    pub fn column_prefix(self) -> &'static str {
        match self {
            PhotoSlot::Front => "photo_front",
            PhotoSlot::Side => "photo_side",
            PhotoSlot::Angle => "photo_angle",
        }
    }
}

/// Query parameters for `GET /api/customers`.
#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    /// Maximum number of results. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
