//! Repository for the `sample_clothes` catalog table.

use sqlx::PgPool;

use crate::models::sample_clothing::{CreateSampleClothing, SampleClothing, SampleClothingQuery};

const COLUMNS: &str = "\
    id, storage_key, url, name, category, color, style, length, \
    gender, body_shape, clothing_prompt, fitting_count, is_active, \
    created_at, updated_at";

/// Provides catalog lookups plus the out-of-band seeding upsert.
pub struct SampleClothingRepo;

impl SampleClothingRepo {
    /// Upsert a catalog item by storage key (used by the seeding script).
    pub async fn upsert(
        pool: &PgPool,
        input: &CreateSampleClothing,
    ) -> Result<SampleClothing, sqlx::Error> {
        let query = format!(
            "INSERT INTO sample_clothes \
                 (storage_key, url, name, category, color, style, length, \
                  gender, body_shape, clothing_prompt) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (storage_key) DO UPDATE SET \
                 url = EXCLUDED.url, \
                 name = EXCLUDED.name, \
                 category = EXCLUDED.category, \
                 color = EXCLUDED.color, \
                 style = EXCLUDED.style, \
                 length = EXCLUDED.length, \
                 gender = EXCLUDED.gender, \
                 body_shape = EXCLUDED.body_shape, \
                 clothing_prompt = EXCLUDED.clothing_prompt, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SampleClothing>(&query)
            .bind(&input.storage_key)
            .bind(&input.url)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.color)
            .bind(&input.style)
            .bind(&input.length)
            .bind(&input.gender)
            .bind(&input.body_shape)
            .bind(&input.clothing_prompt)
            .fetch_one(pool)
            .await
    }

    /// Look up a catalog item by its storage key.
    pub async fn find_by_key(
        pool: &PgPool,
        storage_key: &str,
    ) -> Result<Option<SampleClothing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sample_clothes WHERE storage_key = $1");
        sqlx::query_as::<_, SampleClothing>(&query)
            .bind(storage_key)
            .fetch_optional(pool)
            .await
    }

    /// List active catalog items with optional gender/body-shape/category
    /// filters, matching the browse UI's filter combinations.
    pub async fn list(
        pool: &PgPool,
        params: &SampleClothingQuery,
    ) -> Result<Vec<SampleClothing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sample_clothes \
             WHERE is_active \
               AND ($1::TEXT IS NULL OR gender = $1) \
               AND ($2::TEXT IS NULL OR body_shape = $2) \
               AND ($3::TEXT IS NULL OR category = $3) \
             ORDER BY storage_key ASC"
        );
        sqlx::query_as::<_, SampleClothing>(&query)
            .bind(&params.gender)
            .bind(&params.body_style)
            .bind(&params.category)
            .fetch_all(pool)
            .await
    }

    /// Bump the fitting counter after a successful synthesis.
    pub async fn increment_fitting_count(
        pool: &PgPool,
        storage_key: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE sample_clothes \
             SET fitting_count = fitting_count + 1, updated_at = NOW() \
             WHERE storage_key = $1",
        )
        .bind(storage_key)
        .execute(pool)
        .await?;
        Ok(())
    }
}
