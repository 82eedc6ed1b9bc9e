//! Client half of the fitting polling protocol.
//!
//! [`FittingClient`] submits a fitting job and then polls the result
//! endpoint on a fixed interval until the record reaches a terminal state
//! or the attempt ceiling is hit. The ceiling is advisory: hitting it says
//! nothing about the job, which may still complete server-side afterwards.

use std::time::Duration;

use aplfit_core::fitting::{FittingStatus, MAX_POLL_ATTEMPTS, POLL_INTERVAL};
use aplfit_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Polling cadence and budget. [`Default`] gives the production values
/// (2 s interval, 60 attempts); tests shrink both.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

/// Body for the submit call. Field names follow the server's wire protocol.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFitting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<DbId>,
    pub customer_photo_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_photo_s3_key: Option<String>,
    pub clothing_ref: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clothing_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
}

/// Acknowledgement from the submit call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedFitting {
    pub fitting_record_id: DbId,
    pub status: FittingStatus,
}

/// The slice of the fitting record the polling loop needs.
#[derive(Debug, Clone, Deserialize)]
pub struct PolledRecord {
    pub id: DbId,
    pub status: FittingStatus,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
    pub error_code: Option<String>,
}

/// Errors from submission or polling.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The request could not be sent or the response not read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server does not know the record.
    #[error("Fitting record {0} not found")]
    NotFound(DbId),

    /// Any other non-success response.
    #[error("Server returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The server reported the job as failed.
    #[error("Fitting job failed ({code:?}): {message}")]
    JobFailed {
        code: Option<String>,
        message: String,
    },

    /// The attempt ceiling was reached without a terminal state. Advisory
    /// only: the job may still complete server-side.
    #[error("No terminal state after {attempts} polling attempts")]
    Timeout { attempts: u32 },
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// HTTP client for the fitting API.
pub struct FittingClient {
    base_url: String,
    http: reqwest::Client,
    settings: PollSettings,
}

impl FittingClient {
    /// Create a client with the production polling settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            settings: PollSettings::default(),
        }
    }

    /// Override the polling cadence and budget.
    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Submit a fitting job. Returns as soon as the server has accepted it;
    /// the job itself runs in the background.
    pub async fn submit(&self, request: &SubmitFitting) -> Result<SubmittedFitting, PollError> {
        let response = self
            .http
            .post(format!("{}/api/fitting/create", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: Envelope<SubmittedFitting> = response.json().await?;
        Ok(envelope.data)
    }

    /// Fetch the current state of a fitting record.
    pub async fn get_result(&self, id: DbId) -> Result<PolledRecord, PollError> {
        let response = self
            .http
            .get(format!("{}/api/fitting/result/{id}", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PollError::NotFound(id));
        }
        if !status.is_success() {
            return Err(PollError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: Envelope<PolledRecord> = response.json().await?;
        Ok(envelope.data)
    }

    /// Poll until the record reaches a terminal state or the attempt
    /// ceiling is hit.
    ///
    /// `completed` returns the record; `failed` becomes
    /// [`PollError::JobFailed`]; exhausting the budget becomes
    /// [`PollError::Timeout`].
    pub async fn wait_for_result(&self, id: DbId) -> Result<PolledRecord, PollError> {
        for attempt in 1..=self.settings.max_attempts {
            let record = self.get_result(id).await?;

            match record.status {
                FittingStatus::Completed => {
                    tracing::debug!(record_id = id, attempt, "Fitting completed");
                    return Ok(record);
                }
                FittingStatus::Failed => {
                    return Err(PollError::JobFailed {
                        code: record.error_code,
                        message: record.error_message.unwrap_or_default(),
                    });
                }
                FittingStatus::Pending | FittingStatus::Processing => {
                    tokio::time::sleep(self.settings.interval).await;
                }
            }
        }

        Err(PollError::Timeout {
            attempts: self.settings.max_attempts,
        })
    }

    /// Submit a job and poll it to its terminal state.
    pub async fn run(&self, request: &SubmitFitting) -> Result<PolledRecord, PollError> {
        let submitted = self.submit(request).await?;
        self.wait_for_result(submitted.fitting_record_id).await
    }
}
