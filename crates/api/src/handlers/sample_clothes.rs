//! Handler for the `/sample-clothes` catalog listing.
//!
//! The catalog lives in object storage under `sample_clothes/`; the listing
//! is driven by key structure (`sample_clothes/{gender}/{body_style}/
//! {category}/{file}`), with presigned URLs so the bucket can stay private.

use std::time::Duration;

use aplfit_db::models::sample_clothing::SampleClothingQuery;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Catalog keys live under this prefix in the bucket.
const CATALOG_PREFIX: &str = "sample_clothes/";

/// Presigned URL validity for catalog images (24 hours).
const SIGNED_URL_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Image file extensions recognized as catalog entries.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// One catalog entry in the listing response.
#[derive(Debug, Serialize)]
pub struct SampleClothingEntry {
    pub file_name: String,
    pub key: String,
    pub url: String,
    pub gender: Option<String>,
    pub body_style: Option<String>,
    pub category: Option<String>,
    pub size: i64,
}

/// GET /api/sample-clothes
///
/// List catalog clothing, optionally narrowed by `gender`, `body_style`
/// (female only), and `category`. Filters narrow the listing prefix, so
/// the store only returns the matching subtree.
pub async fn list_sample_clothes(
    State(state): State<AppState>,
    Query(params): Query<SampleClothingQuery>,
) -> AppResult<impl IntoResponse> {
    let prefix = build_prefix(&params);

    let objects = state.store.list(&prefix).await?;

    let mut entries = Vec::new();
    for object in objects {
        if !has_image_extension(&object.key) {
            continue;
        }
        let url = state.store.presign_get(&object.key, SIGNED_URL_EXPIRY).await?;
        entries.push(entry_from_key(object.key, url, object.size));
    }

    tracing::debug!(prefix = %prefix, count = entries.len(), "Listed sample clothes");

    Ok(Json(DataResponse { data: entries }))
}

/// Build the storage prefix from the filter combination.
fn build_prefix(params: &SampleClothingQuery) -> String {
    let mut prefix = CATALOG_PREFIX.to_string();

    if let Some(gender) = &params.gender {
        prefix.push_str(gender);
        prefix.push('/');

        // Body style folders exist only under the female tree.
        if gender == "female" {
            if let Some(body_style) = &params.body_style {
                prefix.push_str(body_style);
                prefix.push('/');
            }
        }

        if let Some(category) = &params.category {
            prefix.push_str(category);
            prefix.push('/');
        }
    }

    prefix
}

fn has_image_extension(key: &str) -> bool {
    key.rsplit('.')
        .next()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Parse catalog metadata out of a key of the form
/// `sample_clothes/{gender}/{body_style}/{category}/{file}` (body style is
/// absent in the male tree).
fn entry_from_key(key: String, url: String, size: i64) -> SampleClothingEntry {
    let parts: Vec<&str> = key.split('/').collect();
    let file_name = parts.last().map(|s| s.to_string()).unwrap_or_default();

    let gender = parts.get(1).map(|s| s.to_string());
    let (body_style, category) = match (gender.as_deref(), parts.len()) {
        // sample_clothes/female/{body_style}/{category}/{file}
        (Some("female"), 5) => (
            parts.get(2).map(|s| s.to_string()),
            parts.get(3).map(|s| s.to_string()),
        ),
        // sample_clothes/{gender}/{category}/{file}
        (_, 4) => (None, parts.get(2).map(|s| s.to_string())),
        _ => (None, None),
    };

    SampleClothingEntry {
        file_name,
        key,
        url,
        gender,
        body_style,
        category,
        size,
    }
}
