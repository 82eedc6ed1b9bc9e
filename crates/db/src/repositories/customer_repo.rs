//! Repository for the `customers` table.

use aplfit_core::types::DbId;
use chrono::Utc;
use sqlx::PgPool;

use crate::models::customer::{CreateCustomer, Customer, CustomerListQuery, PhotoSlot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, phone, email, gender, \
    photo_front_url, photo_front_key, photo_front_filename, \
    photo_side_url, photo_side_key, photo_side_filename, \
    photo_angle_url, photo_angle_key, photo_angle_filename, \
    body_shape, height_bucket, weight_bucket, prompt_text, \
    created_at, updated_at";

/// Maximum page size for customer listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for customer listing.
const DEFAULT_LIMIT: i64 = 20;

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    ///
    /// A missing name gets a generated `guest-{millis}` placeholder so
    /// walk-in submissions without intake data still get a row.
    pub async fn create(pool: &PgPool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let name = input
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("guest-{}", Utc::now().timestamp_millis()));

        let query = format!(
            "INSERT INTO customers \
                 (name, phone, email, gender, body_shape, height_bucket, weight_bucket, \
                  photo_front_url, photo_front_key, photo_front_filename) \
             VALUES ($1, $2, $3, COALESCE($4, 'female'), $5, $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&name)
            .bind(&input.phone)
            .bind(&input.email)
            .bind(&input.gender)
            .bind(&input.body_shape)
            .bind(&input.height_bucket)
            .bind(&input.weight_bucket)
            .bind(&input.photo_front_url)
            .bind(&input.photo_front_key)
            .bind(&input.photo_front_filename)
            .fetch_one(pool)
            .await
    }

    /// Find a customer by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = $1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Best-effort lookup by the (name, phone) merge key.
    ///
    /// The index is non-unique; under concurrent identical submissions
    /// duplicates can exist. Returns the most recent match.
    pub async fn find_by_name_phone(
        pool: &PgPool,
        name: &str,
        phone: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM customers \
             WHERE name = $1 AND phone = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(name)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// List customers, most recent first.
    pub async fn list(
        pool: &PgPool,
        params: &CustomerListQuery,
    ) -> Result<Vec<Customer>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM customers \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total number of customers (for list pagination).
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(pool)
            .await
    }

    /// Store an uploaded photo reference in one of the three slots.
    ///
    /// Returns `None` if no customer with the given id exists.
    pub async fn set_photo(
        pool: &PgPool,
        id: DbId,
        slot: PhotoSlot,
        url: &str,
        key: &str,
        filename: &str,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let prefix = slot.column_prefix();
        let query = format!(
            "UPDATE customers \
             SET {prefix}_url = $2, {prefix}_key = $3, {prefix}_filename = $4, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(url)
            .bind(key)
            .bind(filename)
            .fetch_optional(pool)
            .await
    }

    /// Record the most recent derived prompt for a customer.
    pub async fn set_prompt_text(
        pool: &PgPool,
        id: DbId,
        prompt: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE customers SET prompt_text = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(prompt)
            .execute(pool)
            .await?;
        Ok(())
    }
}
