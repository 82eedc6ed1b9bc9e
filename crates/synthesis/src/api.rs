//! REST client for the Replicate predictions API.
//!
//! Wraps prediction creation and retrieval using [`reqwest`]. The
//! higher-level polling loop lives in [`crate::provider`].

use serde::Deserialize;

/// Default base URL for the Replicate API.
pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com/v1";

/// HTTP client for the Replicate predictions endpoints.
pub struct ReplicateApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

/// A prediction resource as returned by the API.
///
/// Only the fields the fitting flow reads are modeled; everything else in
/// the response body is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    /// Server-assigned prediction identifier.
    pub id: String,
    /// Lifecycle status: `starting`, `processing`, `succeeded`, `failed`,
    /// or `canceled`.
    pub status: String,
    /// Model output once succeeded: either a single URL string or an array
    /// of URL strings depending on the model.
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Error description once failed.
    #[serde(default)]
    pub error: Option<String>,
}

impl Prediction {
    /// Whether the prediction has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }

    /// Extract the result image URL from the output value.
    ///
    /// IDM-VTON returns a single URL string; some models return an array,
    /// in which case the first element is taken.
    pub fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url.clone()),
            serde_json::Value::Array(items) => items
                .first()
                .and_then(|v| v.as_str())
                .map(ToString::to_string),
            _ => None,
        }
    }
}

/// Errors from the Replicate REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ReplicateApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Replicate returned a non-2xx status code.
    #[error("Replicate API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl ReplicateApi {
    /// Create a new API client.
    ///
    /// * `token` - Replicate API token (`REPLICATE_API_TOKEN`).
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    /// Create an API client against a non-default base URL (tests).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    /// Create a prediction for a model version with the given input.
    ///
    /// Sends `POST /predictions`; the response carries the prediction in
    /// its initial (usually `starting`) status.
    pub async fn create_prediction(
        &self,
        version: &str,
        input: &serde_json::Value,
    ) -> Result<Prediction, ReplicateApiError> {
        let body = serde_json::json!({
            "version": version,
            "input": input,
        });

        let response = self
            .client
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current state of a prediction.
    ///
    /// Sends `GET /predictions/{id}`.
    pub async fn get_prediction(&self, id: &str) -> Result<Prediction, ReplicateApiError> {
        let response = self
            .client
            .get(format!("{}/predictions/{}", self.base_url, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure a success status code, then parse the JSON body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ReplicateApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ReplicateApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}
