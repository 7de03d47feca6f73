use thiserror::Error;

/// Why a request could not be captured into a job descriptor.
///
/// Both variants send the request down the normal synchronous path; neither
/// is shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("No bulk action requested")]
    NotTriggered,

    #[error("Unsupported bulk action: {0}")]
    UnsupportedAction(String),
}

/// Failures that abort a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Request verification failed: {0}")]
    InvalidNonce(String),

    #[error("Job store error: {0}")]
    Store(#[from] anyhow::Error),
}
