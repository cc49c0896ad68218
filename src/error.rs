//! Error types
//!
//! Only session establishment and configuration can fail. Per-frame
//! conditions (lost tracking, assets still loading) are handled inside the
//! sim and never surface as errors.

use thiserror::Error;

/// Failure to establish the AR session. Fatal for the run; no retry.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser/device has no immersive AR support
    #[error("immersive AR is not supported on this device")]
    Unsupported,
    /// The platform refused to start the session (permission, user gesture)
    #[error("AR session request was denied: {0}")]
    Denied(String),
    /// The session request options could not be assembled
    #[error("could not build AR session options: {0}")]
    Options(String),
    /// A required reference space could not be created
    #[error("reference space '{0}' is unavailable")]
    ReferenceSpace(String),
    /// Hit-test source creation failed
    #[error("hit-test source request failed: {0}")]
    HitTestSource(String),
    /// Canvas or graphics context setup failed
    #[error("graphics setup failed: {0}")]
    Graphics(String),
}

/// Invalid tuning data
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl TuningError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        TuningError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
