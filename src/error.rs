//! Error kinds surfaced by the reconciliation pipeline.
//!
//! Store and provider failures keep their typed source so the binary can
//! print the full chain; the variant says what kind of failure it was.

use edgepin_config::StoreError;
use edgepin_provider::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A stage, distribution, function or published version is absent.
    #[error("{0}")]
    NotFound(String),

    /// The stage store is unreadable or malformed.
    #[error(transparent)]
    Parse(StoreError),

    /// The stage store could not be written back.
    #[error(transparent)]
    Store(StoreError),

    /// The provider failed, timed out, or answered with something unusable.
    #[error(transparent)]
    Upstream(ProviderError),

    /// The distribution changed between fetch and submit.
    #[error(transparent)]
    Conflict(ProviderError),

    /// The local configuration cannot be acted on as written.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::StageNotFound { .. } => SyncError::NotFound(e.to_string()),
            StoreError::Read { .. } | StoreError::Malformed { .. } | StoreError::InvalidStage { .. } => {
                SyncError::Parse(e)
            }
            StoreError::Serialize(_) | StoreError::Write { .. } => SyncError::Store(e),
        }
    }
}

impl From<ProviderError> for SyncError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::NotFound { .. } => SyncError::NotFound(e.to_string()),
            ProviderError::PreconditionFailed { .. } => SyncError::Conflict(e),
            _ => SyncError::Upstream(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_store_errors_map_to_kinds() {
        let missing = StoreError::StageNotFound {
            stage: "prod".to_string(),
            path: PathBuf::from("image_flex_config.json"),
        };
        assert!(matches!(SyncError::from(missing), SyncError::NotFound(ref m) if m.contains("prod")));

        let malformed = StoreError::Malformed {
            path: PathBuf::from("image_flex_config.json"),
            details: "EOF".to_string(),
        };
        assert!(matches!(SyncError::from(malformed), SyncError::Parse(_)));
    }

    #[test]
    fn test_provider_errors_map_to_kinds() {
        let stale = ProviderError::PreconditionFailed {
            operation: "cloudfront UpdateDistribution".to_string(),
            details: "stale".to_string(),
        };
        assert!(matches!(SyncError::from(stale), SyncError::Conflict(_)));

        let timeout = ProviderError::Timeout {
            operation: "lambda ListVersionsByFunction".to_string(),
            secs: 60,
        };
        let err = SyncError::from(timeout);
        assert!(matches!(err, SyncError::Upstream(_)));
        assert!(err.to_string().contains("timed out"), "{err}");

        let gone = ProviderError::NotFound {
            operation: "cloudfront GetDistributionConfig".to_string(),
            resource: "distribution 'E1'".to_string(),
            details: "NoSuchDistribution".to_string(),
        };
        assert!(matches!(SyncError::from(gone), SyncError::NotFound(_)));
    }
}
