//! The [`SynthesisProvider`] seam and the Replicate-backed implementation.

use std::time::Duration;

use bytes::Bytes;

use crate::api::{ReplicateApi, ReplicateApiError};

/// IDM-VTON (ECCV 2024) on Replicate, the virtual try-on model driving all
/// fittings. Pinned to an exact version hash.
pub const DEFAULT_MODEL_VERSION: &str =
    "cuuupid/idm-vton:c871bb9b046607b680449ecbae55fd8c6d945e0a1948644bf2361b3d021d3ff4";

/// Interval between provider-side prediction status checks.
const PREDICTION_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Timeout for downloading the result image.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the synthesis layer.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    /// Transport or API-level failure talking to the provider.
    #[error(transparent)]
    Api(#[from] ReplicateApiError),

    /// The provider ran the prediction and reported failure.
    #[error("Synthesis failed: {0}")]
    Failed(String),

    /// The prediction succeeded but returned no usable image URL.
    #[error("Synthesis returned no output image")]
    MissingOutput,

    /// Downloading the result image failed.
    #[error("Result download failed: {0}")]
    Download(String),
}

/// Opaque image-synthesis seam.
///
/// Implementations compose a person image and a garment image into a single
/// "wearing" image given a text prompt, returning the result image URL.
#[async_trait::async_trait]
pub trait SynthesisProvider: Send + Sync {
    async fn synthesize(
        &self,
        person_image_url: &str,
        garment_image_url: &str,
        prompt: &str,
    ) -> Result<String, SynthesisError>;
}

/// Provider configuration, from environment variables.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// API token (`REPLICATE_API_TOKEN`).
    pub token: String,
    /// Model version to run (`REPLICATE_MODEL_VERSION`, defaults to
    /// [`DEFAULT_MODEL_VERSION`]).
    pub model_version: String,
}

impl SynthesisConfig {
    pub fn from_env() -> Self {
        let token =
            std::env::var("REPLICATE_API_TOKEN").expect("REPLICATE_API_TOKEN must be set");
        let model_version = std::env::var("REPLICATE_MODEL_VERSION")
            .unwrap_or_else(|_| DEFAULT_MODEL_VERSION.to_string());
        Self {
            token,
            model_version,
        }
    }
}

/// Replicate-backed synthesis provider.
pub struct ReplicateProvider {
    api: ReplicateApi,
    model_version: String,
}

impl ReplicateProvider {
    pub fn new(config: SynthesisConfig) -> Self {
        Self {
            api: ReplicateApi::new(config.token),
            model_version: config.model_version,
        }
    }

    /// Build a provider around an existing API client (tests).
    pub fn with_api(api: ReplicateApi, model_version: String) -> Self {
        Self { api, model_version }
    }

    /// Model input for one fitting. Fixed knobs (crop off, 30 denoise
    /// steps, seed 42) keep output stable for identical inputs.
    fn build_input(person_image_url: &str, garment_image_url: &str, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "human_img": person_image_url,
            "garm_img": garment_image_url,
            "garment_des": prompt,
            "is_checked": true,
            "is_checked_crop": false,
            "denoise_steps": 30,
            "seed": 42,
        })
    }
}

#[async_trait::async_trait]
impl SynthesisProvider for ReplicateProvider {
    /// Create a prediction and wait for it to reach a terminal status.
    ///
    /// No timeout is enforced here: the call may run for tens of seconds
    /// and, from this layer's point of view, indefinitely. Only the HTTP
    /// client's polling budget bounds the overall wait.
    async fn synthesize(
        &self,
        person_image_url: &str,
        garment_image_url: &str,
        prompt: &str,
    ) -> Result<String, SynthesisError> {
        let input = Self::build_input(person_image_url, garment_image_url, prompt);

        let mut prediction = self
            .api
            .create_prediction(&self.model_version, &input)
            .await?;

        tracing::info!(
            prediction_id = %prediction.id,
            prompt,
            "Synthesis prediction created",
        );

        while !prediction.is_terminal() {
            tokio::time::sleep(PREDICTION_POLL_INTERVAL).await;
            prediction = self.api.get_prediction(&prediction.id).await?;
        }

        match prediction.status.as_str() {
            "succeeded" => {
                let url = prediction.output_url().ok_or(SynthesisError::MissingOutput)?;
                tracing::info!(prediction_id = %prediction.id, result_url = %url, "Synthesis succeeded");
                Ok(url)
            }
            other => {
                let message = prediction
                    .error
                    .clone()
                    .unwrap_or_else(|| format!("prediction ended with status {other}"));
                tracing::warn!(prediction_id = %prediction.id, status = other, error = %message, "Synthesis failed");
                Err(SynthesisError::Failed(message))
            }
        }
    }
}

/// Download an image from a URL (the provider's result is only reachable by
/// URL; the bytes are re-uploaded to our own object storage afterwards).
pub async fn download_image(client: &reqwest::Client, url: &str) -> Result<Bytes, SynthesisError> {
    let response = client
        .get(url)
        .timeout(DOWNLOAD_TIMEOUT)
        .send()
        .await
        .map_err(|e| SynthesisError::Download(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SynthesisError::Download(format!(
            "GET {url} returned {}",
            response.status()
        )));
    }

    response
        .bytes()
        .await
        .map_err(|e| SynthesisError::Download(e.to_string()))
}
