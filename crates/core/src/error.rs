use thiserror::Error;

/// Failure taxonomy for the Q&A pipeline. Every variant is an anticipated
/// condition handled as a value; none of these unwind across the crate API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QaError {
    #[error("report not found: {0}")]
    ReportNotFound(String),
    #[error("question is empty")]
    InvalidQuestion,
    #[error("language model capability is not configured")]
    CapabilityUnconfigured,
    #[error("language model call failed: {0}")]
    CapabilityError(String),
    #[error("language model call timed out")]
    CapabilityTimeout,
}

impl QaError {
    /// Short machine-readable tag, used by HTTP responses and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            QaError::ReportNotFound(_) => "report_not_found",
            QaError::InvalidQuestion => "invalid_question",
            QaError::CapabilityUnconfigured => "capability_unconfigured",
            QaError::CapabilityError(_) => "capability_error",
            QaError::CapabilityTimeout => "capability_timeout",
        }
    }
}

pub type Result<T> = std::result::Result<T, QaError>;
