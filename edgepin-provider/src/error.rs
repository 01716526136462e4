//! Typed errors for provider calls.

use thiserror::Error;

/// Failure of a single provider operation.
///
/// `operation` is the service call being made (for example
/// `cloudfront GetDistributionConfig`), so messages identify the step.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The distribution, function, or version does not exist.
    #[error("{operation}: {resource} not found: {details}")]
    NotFound {
        operation: String,
        resource: String,
        details: String,
    },

    /// The If-Match token no longer matches the distribution's current ETag.
    #[error("{operation}: concurrency token rejected, the distribution changed since it was fetched: {details}")]
    PreconditionFailed { operation: String, details: String },

    /// The call did not finish within the configured timeout.
    #[error("{operation}: timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// The service rejected the call for any other reason.
    #[error("{operation}: service error {code}: {details}")]
    Failed {
        operation: String,
        code: String,
        details: String,
    },

    /// No response arrived: credentials, signing, DNS or connection trouble.
    #[error("{operation}: request failed before a response arrived: {details}")]
    Unreachable { operation: String, details: String },

    /// The response could not be decoded or lacked required fields.
    #[error("{operation}: malformed provider response: {details}")]
    Malformed { operation: String, details: String },
}

impl ProviderError {
    pub(crate) fn malformed(operation: &str, details: impl Into<String>) -> Self {
        ProviderError::Malformed {
            operation: operation.to_string(),
            details: details.into(),
        }
    }
}
