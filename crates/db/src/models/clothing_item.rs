//! Uploaded clothing item entity and DTOs.

use aplfit_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `clothing_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClothingItem {
    pub id: DbId,
    pub name: String,
    pub description: String,

    pub image_url: String,
    pub image_key: String,
    pub thumbnail_url: Option<String>,

    pub category: String,
    pub color: String,
    pub hex_color: Option<String>,
    pub style: Option<String>,
    pub gender: String,

    pub is_active: bool,
    pub fitting_count: i32,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClothingItem {
    /// Best available text fragment for the synthesis prompt:
    /// description, then name, then category.
    pub fn prompt_description(&self) -> &str {
        if !self.description.trim().is_empty() {
            &self.description
        } else if !self.name.trim().is_empty() {
            &self.name
        } else {
            &self.category
        }
    }
}

/// DTO for inserting an uploaded clothing item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateClothingItem {
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub image_key: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub color: String,
    pub hex_color: Option<String>,
    pub style: Option<String>,
    pub gender: Option<String>,
}

/// Query parameters for listing clothing items.
#[derive(Debug, Default, Deserialize)]
pub struct ClothingListQuery {
    pub category: Option<String>,
    pub gender: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
