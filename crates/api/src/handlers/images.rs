//! Multipart image upload handlers.
//!
//! Uploads land in object storage; clothing uploads additionally create a
//! `clothing_items` row so the image can be referenced by id in fitting
//! submissions.

use aplfit_core::types::DbId;
use aplfit_db::models::clothing_item::CreateClothingItem;
use aplfit_db::models::customer::PhotoSlot;
use aplfit_db::repositories::{ClothingItemRepo, CustomerRepo};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Upload size cap enforced by field extraction (10 MB).
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// An uploaded image file: original filename, declared content type, bytes.
struct UploadedFile {
    filename: String,
    content_type: String,
    data: Bytes,
}

/// Response for `POST /api/images/upload-customer`.
#[derive(Debug, Serialize)]
pub struct CustomerPhotoUploaded {
    pub url: String,
    pub key: String,
    pub size: usize,
    pub customer_id: Option<DbId>,
}

/// POST /api/images/upload-customer
///
/// Multipart fields: the photo file (field `customerPhoto` or `file`),
/// optional `customer_id`, optional `slot` (`front`/`side`/`angle`,
/// defaults to front). When a customer id is supplied the photo reference
/// is also stored on that customer's slot.
pub async fn upload_customer_photo(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (file, fields) = collect_upload(multipart, &["customerPhoto", "file"]).await?;

    let customer_id: Option<DbId> = fields
        .iter()
        .find(|(name, _)| name == "customer_id" || name == "customerId")
        .and_then(|(_, value)| value.parse().ok());

    let slot = fields
        .iter()
        .find(|(name, _)| name == "slot")
        .map(|(_, value)| match value.as_str() {
            "side" => PhotoSlot::Side,
            "angle" => PhotoSlot::Angle,
            _ => PhotoSlot::Front,
        })
        .unwrap_or(PhotoSlot::Front);

    // Anonymous uploads are grouped under a temp folder until a customer
    // record exists.
    let owner = customer_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| format!("temp-{}", Utc::now().timestamp_millis()));

    let key = aplfit_storage::keys::unique_key(
        &aplfit_storage::keys::customer_photo_folder(&owner),
        &file.filename,
    );
    let stored = state.store.put(file.data, &key, &file.content_type).await?;

    if let Some(id) = customer_id {
        let updated =
            CustomerRepo::set_photo(&state.pool, id, slot, &stored.url, &stored.key, &file.filename)
                .await?;
        if updated.is_none() {
            tracing::warn!(customer_id = id, "Photo uploaded for unknown customer id");
        }
    }

    tracing::info!(key = %stored.key, size = stored.size, "Customer photo uploaded");

    Ok(Json(DataResponse {
        data: CustomerPhotoUploaded {
            url: stored.url,
            key: stored.key,
            size: stored.size,
            customer_id,
        },
    }))
}

/// POST /api/images/upload-clothing
///
/// Multipart fields: the image file (field `clothingImage` or `file`) plus
/// clothing metadata. `name`, `category`, and `color` are required.
/// Returns 201 with the created clothing item.
pub async fn upload_clothing_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let (file, fields) = collect_upload(multipart, &["clothingImage", "file"]).await?;

    let field = |name: &str| -> Option<String> {
        fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .filter(|v| !v.trim().is_empty())
    };

    let (Some(name), Some(category), Some(color)) =
        (field("name"), field("category"), field("color"))
    else {
        return Err(AppError::BadRequest(
            "name, category, and color are required".to_string(),
        ));
    };

    let key = aplfit_storage::keys::unique_key(
        &aplfit_storage::keys::clothing_image_folder(&category),
        &file.filename,
    );
    let stored = state.store.put(file.data, &key, &file.content_type).await?;

    let item = ClothingItemRepo::create(
        &state.pool,
        &CreateClothingItem {
            name,
            description: field("description"),
            image_url: stored.url,
            image_key: stored.key,
            thumbnail_url: None,
            category,
            color,
            hex_color: field("hex_color").or_else(|| field("hexColor")),
            style: field("style"),
            gender: field("gender"),
        },
    )
    .await?;

    tracing::info!(clothing_item_id = item.id, "Clothing image uploaded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// Walk the multipart stream, returning the image file (from one of the
/// accepted field names) and all remaining text fields.
async fn collect_upload(
    mut multipart: Multipart,
    file_fields: &[&str],
) -> AppResult<(UploadedFile, Vec<(String, String)>)> {
    let mut file: Option<UploadedFile> = None;
    let mut fields: Vec<(String, String)> = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = part.name().unwrap_or("").to_string();

        if file_fields.contains(&name.as_str()) {
            let filename = part.file_name().unwrap_or("upload.jpg").to_string();
            let content_type = part
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            if !content_type.starts_with("image/") {
                return Err(AppError::BadRequest(
                    "Only image files can be uploaded".to_string(),
                ));
            }

            let data = part
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            if data.len() > MAX_UPLOAD_BYTES {
                return Err(AppError::BadRequest(
                    "Uploaded file exceeds the 10 MB limit".to_string(),
                ));
            }

            file = Some(UploadedFile {
                filename,
                content_type,
                data,
            });
        } else {
            let text = part
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            fields.push((name, text));
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file was uploaded".to_string()))?;
    Ok((file, fields))
}
