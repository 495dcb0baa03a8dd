//! Error taxonomy for the planning engine.
//!
//! Variant names are the contract (`spec.md` §7); propagation rules live
//! with their callers, not here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("could not be geocoded: {0}")]
    NotFound(String),

    #[error("map provider quota exhausted")]
    ProviderQuota,

    #[error("map provider rate limit exceeded")]
    ProviderRateLimit,

    #[error("map provider denied the request: {0}")]
    ProviderDenied(String),

    #[error("malformed request to map provider: {0}")]
    ProviderInvalidRequest(String),

    #[error("map provider network failure: {0}")]
    ProviderNetwork(String),

    #[error("request deadline exceeded")]
    Deadline,

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlannerError {
    /// The taxonomy kind as a stable string, for `Response::Error.kind`.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::Validation(_) => "Validation",
            PlannerError::NotFound(_) => "NotFound",
            PlannerError::ProviderQuota => "ProviderQuota",
            PlannerError::ProviderRateLimit => "ProviderRateLimit",
            PlannerError::ProviderDenied(_) => "ProviderDenied",
            PlannerError::ProviderInvalidRequest(_) => "ProviderInvalidRequest",
            PlannerError::ProviderNetwork(_) => "ProviderNetwork",
            PlannerError::Deadline => "Deadline",
            PlannerError::Internal(_) => "Internal",
        }
    }

    /// Whether this failure should trigger the fallback planner.
    ///
    /// `ProviderDenied` and `ProviderInvalidRequest` are surfaced fatal per
    /// the `spec.md` §7 error table rather than triggering fallback; see
    /// `DESIGN.md` for the resolution of the §4.5/§7 wording conflict.
    /// `ProviderRateLimit` only reaches here after retries are exhausted
    /// (see `RETRY_LIMIT` in `travel.rs`), so it falls back too.
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            PlannerError::ProviderQuota
                | PlannerError::ProviderRateLimit
                | PlannerError::ProviderNetwork(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, PlannerError::ProviderRateLimit)
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            PlannerError::ProviderNetwork(err.to_string())
        } else if let Some(status) = err.status() {
            status_to_error(status, err.to_string())
        } else {
            PlannerError::ProviderNetwork(err.to_string())
        }
    }
}

pub fn status_to_error(status: reqwest::StatusCode, message: String) -> PlannerError {
    match status.as_u16() {
        429 => PlannerError::ProviderRateLimit,
        401 | 403 => PlannerError::ProviderDenied(message),
        400 => PlannerError::ProviderInvalidRequest(message),
        500..=599 => PlannerError::ProviderNetwork(message),
        _ => PlannerError::Internal(message),
    }
}
