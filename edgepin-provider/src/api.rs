//! Provider-facing traits and the values that cross them.
//!
//! Components receive these as `&dyn` references, so tests can hand in
//! recording fakes instead of a live backend.

use crate::error::ProviderError;
use aws_sdk_cloudfront::types::DistributionConfig;

/// A distribution's full `DistributionConfig` together with its ETag.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSnapshot {
    /// Concurrency token to send back as If-Match
    pub etag: String,
    /// The remote config as received, including fields edgepin never reads
    pub config: DistributionConfig,
}

/// The provider's acknowledgement of an accepted update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAck {
    /// HTTP status of the update response
    pub status_code: u16,
    /// ETag of the distribution after the update, if returned
    pub etag: Option<String>,
    /// Deployment status, e.g. `InProgress`
    pub deployment_status: Option<String>,
}

/// One published (or pseudo) version of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionVersion {
    /// Version marker, e.g. `7` or `$LATEST`
    pub version: String,
    /// Fully qualified ARN of this version
    pub function_arn: String,
}

/// Distribution config read/write with ETag-based optimistic concurrency.
pub trait DistributionApi {
    /// Fetch the complete config and its current ETag.
    fn get_config(&self, distribution_id: &str) -> Result<DistributionSnapshot, ProviderError>;

    /// Submit a complete config. Must fail with
    /// [`ProviderError::PreconditionFailed`] when `if_match` is stale.
    fn update_config(
        &self,
        distribution_id: &str,
        if_match: &str,
        config: &DistributionConfig,
    ) -> Result<UpdateAck, ProviderError>;
}

/// Function version listing.
pub trait FunctionVersionsApi {
    /// All versions of a function, in the order the provider returns them.
    fn list_versions(&self, function_name: &str) -> Result<Vec<FunctionVersion>, ProviderError>;
}
