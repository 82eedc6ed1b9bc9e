//! Fitting-record lifecycle: the status state machine and its constants.
//!
//! Status values are persisted as text. [`FittingStatus::transition_to`]
//! states the forward-only rule as typed code; the repository enforces the
//! same rule at the database with guarded terminal updates.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Machine error code recorded on a fitting record when the synthesis
/// provider fails. This is the only failure code the background path emits.
pub const FITTING_ERROR_CODE: &str = "FITTING_ERROR";

/// Interval between client-side polls of the result endpoint.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Client-side attempt ceiling (60 attempts at 2 s, roughly two minutes).
///
/// Reaching the ceiling is an advisory timeout: the job may still reach a
/// terminal state on the server afterwards.
pub const MAX_POLL_ATTEMPTS: u32 = 60;

/// Lifecycle state of a fitting record.
///
/// Legal transitions move forward only:
/// `Pending -> Processing -> {Completed | Failed}`. Terminal states accept
/// no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl FittingStatus {
    /// Text form stored in the `fitting_records.status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            FittingStatus::Pending => "pending",
            FittingStatus::Processing => "processing",
            FittingStatus::Completed => "completed",
            FittingStatus::Failed => "failed",
        }
    }

    /// Whether this state permits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, FittingStatus::Completed | FittingStatus::Failed)
    }

    /// Validate a transition from `self` to `next`.
    ///
    /// Returns the new state on success, or [`CoreError::Conflict`] for any
    /// backwards, self, or out-of-terminal transition.
    pub fn transition_to(self, next: FittingStatus) -> Result<FittingStatus, CoreError> {
        let legal = matches!(
            (self, next),
            (FittingStatus::Pending, FittingStatus::Processing)
                | (FittingStatus::Processing, FittingStatus::Completed)
                | (FittingStatus::Processing, FittingStatus::Failed)
        );

        if legal {
            Ok(next)
        } else {
            Err(CoreError::Conflict(format!(
                "Illegal fitting status transition: {self} -> {next}"
            )))
        }
    }
}

impl fmt::Display for FittingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FittingStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FittingStatus::Pending),
            "processing" => Ok(FittingStatus::Processing),
            "completed" => Ok(FittingStatus::Completed),
            "failed" => Ok(FittingStatus::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown fitting status: {other}"
            ))),
        }
    }
}
