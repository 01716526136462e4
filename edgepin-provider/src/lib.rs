//! Provider access for edgepin.
//!
//! Provides:
//! - `api`: the `DistributionApi` / `FunctionVersionsApi` seams and their value types
//! - `sdk`: a backend for both traits built on the AWS SDK
//! - `shapes`: CloudFront SDK types to and from API-shaped JSON

pub mod api;
pub mod error;
pub mod sdk;
pub mod shapes;

pub use api::{
    DistributionApi, DistributionSnapshot, FunctionVersion, FunctionVersionsApi, UpdateAck,
};
pub use aws_sdk_cloudfront::types::{CacheBehavior, DistributionConfig};
pub use error::ProviderError;
pub use sdk::{AwsSdk, AwsSdkConfig};
pub use shapes::{FromJson, ShapeError, ToJson};
