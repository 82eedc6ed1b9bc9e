//! Fitting job orchestration.
//!
//! [`submit`] runs in the request path: it validates the request, resolves
//! the clothing reference and the customer, composes the synthesis prompt,
//! and persists the fitting record *before* spawning the background
//! continuation. The HTTP response returns the record id immediately; the
//! synthesis call runs detached and reports its outcome only through the
//! record's status.
//!
//! There is no queue, no concurrency limit, no retry, and no cancellation:
//! each submission spawns one independent task whose single attempt ends in
//! `completed` or `failed`.

use std::time::Duration;

use aplfit_core::error::CoreError;
use aplfit_core::fitting::{FittingStatus, FITTING_ERROR_CODE};
use aplfit_core::prompt::{self, BodyProfile, BodyShape, Gender};
use aplfit_core::types::DbId;
use aplfit_db::models::customer::{CreateCustomer, Customer};
use aplfit_db::models::fitting_record::CreateFittingRecord;
use aplfit_db::repositories::{
    ClothingItemRepo, CustomerRepo, FittingRecordRepo, SampleClothingRepo,
};
use aplfit_storage::keys::{self, SAMPLE_CLOTHES_PREFIX};
use aplfit_synthesis::provider::download_image;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Expiry for presigned catalog image URLs handed to the provider.
const CATALOG_URL_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Body for `POST /api/fitting/create`.
///
/// Field names follow the established wire protocol of the fitting UI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFittingRequest {
    /// Existing customer id; absent or unknown ids trigger lazy creation.
    pub customer_id: Option<DbId>,
    /// URL of the already-uploaded customer photo. Required.
    pub customer_photo_url: Option<String>,
    /// Storage key of the customer photo, when known.
    pub customer_photo_s3_key: Option<String>,
    /// Clothing reference: a catalog storage key (`sample_clothes/...`),
    /// an uploaded clothing item id, or a raw image URL. Required.
    #[serde(alias = "clothingItemId")]
    pub clothing_ref: Option<String>,
    /// Explicit clothing image URL, used for catalog items whose URL the
    /// client already holds.
    pub clothing_image_url: Option<String>,

    // Intake attributes used when a new customer has to be created and for
    // prompt construction.
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub body_shape: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

/// Response for `POST /api/fitting/create`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFittingResponse {
    pub fitting_record_id: DbId,
    pub status: FittingStatus,
}

/// The resolved clothing source for one submission.
struct ResolvedClothing {
    /// URL handed to the synthesis provider.
    image_url: String,
    /// Prompt fragment describing the garment.
    description: String,
    /// Uploaded item id, when the source is an upload.
    item_id: Option<DbId>,
    /// Catalog storage key, when the source is a catalog item.
    catalog_key: Option<String>,
}

/// Submit a fitting job.
///
/// Everything up to and including the record INSERT happens synchronously
/// and surfaces errors as HTTP responses; the synthesis call itself is
/// spawned and can only be observed by polling the record.
pub async fn submit(
    state: &AppState,
    request: CreateFittingRequest,
) -> AppResult<CreateFittingResponse> {
    let photo_url = request
        .customer_photo_url
        .clone()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "customerPhotoUrl is required".to_string(),
            ))
        })?;

    let clothing_ref = request
        .clothing_ref
        .clone()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "clothingRef is required".to_string(),
            ))
        })?;

    let clothing = resolve_clothing(state, &clothing_ref, request.clothing_image_url.clone()).await?;
    let customer = resolve_customer(state, &request, &photo_url).await?;

    // Prompt: garment description + gender term + optional body fragments.
    let gender = Gender::parse_or_default(Some(customer.gender.as_str()));
    let body = BodyProfile {
        body_shape: customer.body_shape.as_deref().and_then(BodyShape::parse),
        height: customer.height_bucket.clone(),
        weight: customer.weight_bucket.clone(),
    };
    let prompt = prompt::compose_prompt(&clothing.description, gender, &body);

    CustomerRepo::set_prompt_text(&state.pool, customer.id, &prompt).await?;

    // The record is persisted in `processing` before the response goes out;
    // the schema's `pending` default is intentionally skipped (no queued
    // pre-acceptance state exists in this flow).
    let record = FittingRecordRepo::create(
        &state.pool,
        &CreateFittingRecord {
            customer_id: customer.id,
            customer_photo_url: photo_url.clone(),
            customer_photo_key: request.customer_photo_s3_key.clone(),
            clothing_item_id: clothing.item_id,
            clothing_image_url: if clothing.item_id.is_some() {
                None
            } else {
                Some(clothing.image_url.clone())
            },
            prompt_text: Some(prompt.clone()),
        },
        FittingStatus::Processing,
    )
    .await?;

    tracing::info!(
        record_id = record.id,
        customer_id = customer.id,
        clothing_ref = %clothing_ref,
        prompt = %prompt,
        "Fitting job submitted",
    );

    // Fire and forget: record creation happens-before this spawn, and the
    // task's terminal UPDATE happens-before any poll that observes it.
    let task_state = state.clone();
    let job = FittingJob {
        record_id: record.id,
        customer_id: customer.id,
        person_image_url: photo_url,
        garment_image_url: clothing.image_url,
        prompt,
        item_id: clothing.item_id,
        catalog_key: clothing.catalog_key,
    };
    tokio::spawn(async move {
        run_fitting(task_state, job).await;
    });

    Ok(CreateFittingResponse {
        fitting_record_id: record.id,
        status: FittingStatus::Processing,
    })
}

/// Everything the background continuation needs; the handler itself keeps
/// only the record id.
struct FittingJob {
    record_id: DbId,
    customer_id: DbId,
    person_image_url: String,
    garment_image_url: String,
    prompt: String,
    item_id: Option<DbId>,
    catalog_key: Option<String>,
}

/// The detached background continuation.
///
/// Must never panic or propagate: every failure is converted into a
/// `failed` record state. A failure to even write that state is logged and
/// swallowed.
async fn run_fitting(state: AppState, job: FittingJob) {
    let record_id = job.record_id;

    match execute_synthesis(&state, &job).await {
        Ok((result_url, result_key)) => {
            match FittingRecordRepo::complete(&state.pool, record_id, &result_url, &result_key)
                .await
            {
                Ok(true) => {
                    // Logged unconditionally: a client that stopped polling
                    // never learns the outcome any other way.
                    tracing::info!(
                        record_id,
                        customer_id = job.customer_id,
                        result_url = %result_url,
                        "Fitting completed",
                    );
                    bump_fitting_count(&state, &job).await;
                }
                Ok(false) => {
                    tracing::warn!(record_id, "Fitting record was already terminal; completion discarded");
                }
                Err(e) => {
                    tracing::error!(record_id, error = %e, "Failed to persist fitting completion");
                }
            }
        }
        Err(message) => {
            match FittingRecordRepo::fail(&state.pool, record_id, &message, FITTING_ERROR_CODE).await
            {
                Ok(true) => {
                    tracing::info!(
                        record_id,
                        customer_id = job.customer_id,
                        error = %message,
                        "Fitting failed",
                    );
                }
                Ok(false) => {
                    tracing::warn!(record_id, "Fitting record was already terminal; failure discarded");
                }
                Err(e) => {
                    tracing::error!(record_id, error = %e, "Failed to persist fitting failure");
                }
            }
        }
    }
}

/// Run the provider call and store the result image, returning the stored
/// URL and key. Any error is flattened to the message recorded on the
/// failed record.
async fn execute_synthesis(state: &AppState, job: &FittingJob) -> Result<(String, String), String> {
    let provider_url = state
        .provider
        .synthesize(&job.person_image_url, &job.garment_image_url, &job.prompt)
        .await
        .map_err(|e| e.to_string())?;

    // The provider's output URL is ephemeral; re-home the bytes into our
    // own storage before recording the result.
    let bytes = download_image(&state.http, &provider_url)
        .await
        .map_err(|e| e.to_string())?;

    let key = keys::unique_key(
        &keys::fitting_result_folder(&job.customer_id.to_string()),
        "ai-fitting.jpg",
    );
    let stored = state
        .store
        .put(bytes, &key, "image/jpeg")
        .await
        .map_err(|e| e.to_string())?;

    Ok((stored.url, stored.key))
}

/// Increment the fitting counter on whichever clothing source was used.
/// Counter bumps are best-effort; a failure only logs.
async fn bump_fitting_count(state: &AppState, job: &FittingJob) {
    let result = match (&job.item_id, &job.catalog_key) {
        (Some(item_id), _) => ClothingItemRepo::increment_fitting_count(&state.pool, *item_id).await,
        (None, Some(key)) => SampleClothingRepo::increment_fitting_count(&state.pool, key).await,
        (None, None) => Ok(()),
    };
    if let Err(e) = result {
        tracing::warn!(record_id = job.record_id, error = %e, "Failed to bump fitting count");
    }
}

/// Resolve a clothing reference to an image URL and prompt description.
///
/// Three forms are accepted:
/// - `sample_clothes/...` — a catalog storage key; metadata comes from the
///   seeded catalog row when present, the image URL from the row, the
///   explicit `clothingImageUrl`, or a presigned URL as a last resort.
/// - a numeric id — an uploaded clothing item; unknown ids are 404.
/// - an `http(s)` URL — used directly with the generic description.
async fn resolve_clothing(
    state: &AppState,
    clothing_ref: &str,
    explicit_url: Option<String>,
) -> AppResult<ResolvedClothing> {
    if clothing_ref.starts_with(SAMPLE_CLOTHES_PREFIX) {
        let row = SampleClothingRepo::find_by_key(&state.pool, clothing_ref).await?;
        let description = row
            .as_ref()
            .and_then(|r| r.clothing_prompt.clone())
            .or_else(|| row.as_ref().map(|r| r.name.clone()))
            .unwrap_or_default();

        let image_url = match explicit_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url,
            None => match &row {
                Some(r) => r.url.clone(),
                None => {
                    state
                        .store
                        .presign_get(clothing_ref, CATALOG_URL_EXPIRY)
                        .await?
                }
            },
        };

        return Ok(ResolvedClothing {
            image_url,
            description,
            item_id: None,
            catalog_key: Some(clothing_ref.to_string()),
        });
    }

    if let Ok(item_id) = clothing_ref.parse::<DbId>() {
        let item = ClothingItemRepo::find_by_id(&state.pool, item_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ClothingItem",
                id: item_id,
            }))?;

        return Ok(ResolvedClothing {
            image_url: item.image_url.clone(),
            description: item.prompt_description().to_string(),
            item_id: Some(item.id),
            catalog_key: None,
        });
    }

    if clothing_ref.starts_with("http://") || clothing_ref.starts_with("https://") {
        return Ok(ResolvedClothing {
            image_url: clothing_ref.to_string(),
            description: String::new(),
            item_id: None,
            catalog_key: None,
        });
    }

    Err(AppError::Core(CoreError::Validation(format!(
        "Unrecognized clothing reference: {clothing_ref}"
    ))))
}

/// Resolve the customer for a submission.
///
/// Preference order: supplied id, then the (name, phone) merge key, then
/// lazy creation from the intake attributes. The merge key is best-effort
/// only: concurrent identical submissions may still create duplicates.
async fn resolve_customer(
    state: &AppState,
    request: &CreateFittingRequest,
    photo_url: &str,
) -> AppResult<Customer> {
    if let Some(id) = request.customer_id {
        if let Some(customer) = CustomerRepo::find_by_id(&state.pool, id).await? {
            return Ok(customer);
        }
        // Stale or bogus ids fall through to creation rather than failing
        // the submission.
        tracing::debug!(customer_id = id, "Supplied customer id not found; creating a new customer");
    }

    if let (Some(name), Some(phone)) = (&request.name, &request.phone) {
        if let Some(customer) = CustomerRepo::find_by_name_phone(&state.pool, name, phone).await? {
            return Ok(customer);
        }
    }

    let customer = CustomerRepo::create(
        &state.pool,
        &CreateCustomer {
            name: request.name.clone(),
            phone: request.phone.clone(),
            email: None,
            gender: request.gender.clone(),
            body_shape: request.body_shape.clone(),
            height_bucket: request.height.clone(),
            weight_bucket: request.weight.clone(),
            photo_front_url: Some(photo_url.to_string()),
            photo_front_key: request.customer_photo_s3_key.clone(),
            photo_front_filename: None,
        },
    )
    .await?;

    tracing::info!(customer_id = customer.id, "Created customer during fitting submission");
    Ok(customer)
}
