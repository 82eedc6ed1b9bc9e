//! Repository for the `clothing_items` table.

use aplfit_core::types::DbId;
use sqlx::PgPool;

use crate::models::clothing_item::{ClothingItem, ClothingListQuery, CreateClothingItem};

const COLUMNS: &str = "\
    id, name, description, image_url, image_key, thumbnail_url, \
    category, color, hex_color, style, gender, \
    is_active, fitting_count, created_at, updated_at";

const MAX_LIMIT: i64 = 100;
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for uploaded clothing items.
pub struct ClothingItemRepo;

impl ClothingItemRepo {
    /// Insert a new uploaded clothing item, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateClothingItem,
    ) -> Result<ClothingItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO clothing_items \
                 (name, description, image_url, image_key, thumbnail_url, \
                  category, color, hex_color, style, gender) \
             VALUES ($1, COALESCE($2, ''), $3, $4, $5, $6, $7, $8, $9, COALESCE($10, 'unisex')) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClothingItem>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(&input.image_key)
            .bind(&input.thumbnail_url)
            .bind(&input.category)
            .bind(&input.color)
            .bind(&input.hex_color)
            .bind(&input.style)
            .bind(&input.gender)
            .fetch_one(pool)
            .await
    }

    /// Find an item by internal ID. Includes inactive items (an in-flight
    /// fitting may reference an item deactivated after submission).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClothingItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clothing_items WHERE id = $1");
        sqlx::query_as::<_, ClothingItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active items with optional category/gender filters, newest first.
    pub async fn list_active(
        pool: &PgPool,
        params: &ClothingListQuery,
    ) -> Result<Vec<ClothingItem>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM clothing_items \
             WHERE is_active \
               AND ($1::TEXT IS NULL OR category = $1) \
               AND ($2::TEXT IS NULL OR gender = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ClothingItem>(&query)
            .bind(&params.category)
            .bind(&params.gender)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Bump the fitting counter after a successful synthesis.
    pub async fn increment_fitting_count(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE clothing_items \
             SET fitting_count = fitting_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
