//! Catalog clothing entity and DTOs.
//!
//! Catalog rows are seeded out-of-band from the object store; the
//! pre-authored `clothing_prompt` feeds synthesis prompt composition.

use aplfit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `sample_clothes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SampleClothing {
    pub id: DbId,
    pub storage_key: String,
    pub url: String,
    pub name: String,

    pub category: String,
    pub color: Option<String>,
    pub style: Option<String>,
    pub length: Option<String>,
    pub gender: String,
    pub body_shape: Option<String>,

    pub clothing_prompt: Option<String>,

    pub fitting_count: i32,
    pub is_active: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for seeding a catalog item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSampleClothing {
    pub storage_key: String,
    pub url: String,
    pub name: String,
    pub category: String,
    pub color: Option<String>,
    pub style: Option<String>,
    pub length: Option<String>,
    pub gender: String,
    pub body_shape: Option<String>,
    pub clothing_prompt: Option<String>,
}

/// Query parameters for `GET /api/sample-clothes`.
#[derive(Debug, Default, Deserialize)]
pub struct SampleClothingQuery {
    pub gender: Option<String>,
    pub body_style: Option<String>,
    pub category: Option<String>,
}
