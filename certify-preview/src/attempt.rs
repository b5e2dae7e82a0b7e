//! Per-request attempt state machine
//!
//! ```text
//! Idle -> Loading -> { Success, Retrying, Failed }
//! Retrying -> Loading (after the retry delay)
//! ```
//!
//! Transitions are pure; the fetcher owns the timing.

use crate::error::{FailureKind, FetchError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptState {
    #[default]
    Idle,
    /// `attempt` is 1-based
    Loading { attempt: u32 },
    /// Waiting out the delay after `retries` failed attempts
    Retrying { retries: u32, last_error: FetchError },
    Success { attempts: u32 },
    Failed { attempts: u32, cause: FetchError },
}

impl AttemptState {
    pub fn start() -> Self {
        AttemptState::Loading { attempt: 1 }
    }

    pub fn on_success(&self) -> Self {
        AttemptState::Success {
            attempts: self.attempts().max(1),
        }
    }

    /// Retry while the failure is transient and `retry_cap` is not used up
    pub fn on_failure(&self, error: FetchError, retry_cap: u32) -> Self {
        let attempt = self.attempts().max(1);
        if error.is_retryable() && attempt <= retry_cap {
            AttemptState::Retrying {
                retries: attempt,
                last_error: error,
            }
        } else {
            AttemptState::Failed {
                attempts: attempt,
                cause: error,
            }
        }
    }

    pub fn on_result<T>(&self, result: &Result<T, FetchError>, retry_cap: u32) -> Self {
        match result {
            Ok(_) => self.on_success(),
            Err(error) => self.on_failure(error.clone(), retry_cap),
        }
    }

    /// Delay elapsed; issue the next attempt
    pub fn on_retry_elapsed(&self) -> Self {
        match self {
            AttemptState::Retrying { retries, .. } => AttemptState::Loading {
                attempt: retries + 1,
            },
            other => other.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Success { .. } | AttemptState::Failed { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AttemptState::Loading { .. } | AttemptState::Retrying { .. })
    }

    /// Requests issued so far
    pub fn attempts(&self) -> u32 {
        match self {
            AttemptState::Idle => 0,
            AttemptState::Loading { attempt } => *attempt,
            AttemptState::Retrying { retries, .. } => *retries,
            AttemptState::Success { attempts } | AttemptState::Failed { attempts, .. } => *attempts,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            AttemptState::Failed { cause, .. } => Some(cause.kind()),
            _ => None,
        }
    }
}
