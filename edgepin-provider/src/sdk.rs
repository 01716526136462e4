//! Provider backend on the AWS SDK.
//!
//! One shared SDK config (profile, credential chain, operation timeout) feeds
//! a CloudFront client and a Lambda client pinned to the functions' region.
//! Calls are driven to completion on a tokio runtime owned by the binary.
//! Failures are classified from the SDK's typed operation errors.

use crate::api::{
    DistributionApi, DistributionSnapshot, FunctionVersion, FunctionVersionsApi, UpdateAck,
};
use crate::error::ProviderError;
use crate::shapes;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudfront::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudfront::operation::get_distribution_config::GetDistributionConfigError;
use aws_sdk_cloudfront::operation::update_distribution::UpdateDistributionError;
use aws_sdk_cloudfront::types::DistributionConfig;
use aws_sdk_lambda::operation::list_versions_by_function::ListVersionsByFunctionError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const GET_CONFIG_OP: &str = "cloudfront GetDistributionConfig";
const UPDATE_OP: &str = "cloudfront UpdateDistribution";
const LIST_VERSIONS_OP: &str = "lambda ListVersionsByFunction";

/// CloudFront signs in us-east-1 whatever region the profile names.
const CLOUDFRONT_FALLBACK_REGION: &str = "us-east-1";

/// Settings for [`AwsSdk`].
#[derive(Debug, Clone)]
pub struct AwsSdkConfig {
    /// Named profile from the shared AWS config files
    pub profile: Option<String>,
    /// Region for CloudFront calls; the profile's region when unset
    pub cloudfront_region: Option<String>,
    /// Region for Lambda calls
    pub lambda_region: String,
    /// Upper bound on each operation, retries included
    pub timeout: Duration,
}

/// CloudFront and Lambda access through the AWS SDK.
pub struct AwsSdk {
    runtime: Arc<Runtime>,
    cloudfront: aws_sdk_cloudfront::Client,
    lambda: aws_sdk_lambda::Client,
    timeout: Duration,
}

impl AwsSdk {
    /// Resolve credentials and regions, then build both clients.
    pub fn connect(runtime: Arc<Runtime>, config: &AwsSdkConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(config.timeout)
                .build(),
        );
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &config.cloudfront_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = runtime.block_on(loader.load());

        let mut cloudfront = aws_sdk_cloudfront::config::Builder::from(&shared);
        if shared.region().is_none() {
            cloudfront = cloudfront.region(Region::from_static(CLOUDFRONT_FALLBACK_REGION));
        }
        let lambda = aws_sdk_lambda::config::Builder::from(&shared)
            .region(Region::new(config.lambda_region.clone()))
            .build();

        log::debug!(
            "AWS clients ready (profile {:?}, lambda region {})",
            config.profile,
            config.lambda_region
        );
        Self::with_clients(
            runtime,
            aws_sdk_cloudfront::Client::from_conf(cloudfront.build()),
            aws_sdk_lambda::Client::from_conf(lambda),
            config.timeout,
        )
    }

    fn with_clients(
        runtime: Arc<Runtime>,
        cloudfront: aws_sdk_cloudfront::Client,
        lambda: aws_sdk_lambda::Client,
        timeout: Duration,
    ) -> Self {
        Self {
            runtime,
            cloudfront,
            lambda,
            timeout,
        }
    }
}

impl DistributionApi for AwsSdk {
    fn get_config(&self, distribution_id: &str) -> Result<DistributionSnapshot, ProviderError> {
        log::debug!("{} for distribution '{}'", GET_CONFIG_OP, distribution_id);
        let output = self
            .runtime
            .block_on(
                self.cloudfront
                    .get_distribution_config()
                    .id(distribution_id)
                    .send(),
            )
            .map_err(|err| {
                classify(
                    GET_CONFIG_OP,
                    &distribution_resource(distribution_id),
                    self.timeout,
                    err,
                )
            })?;

        let etag = output
            .e_tag()
            .filter(|etag| !etag.is_empty())
            .ok_or_else(|| ProviderError::malformed(GET_CONFIG_OP, "missing ETag"))?
            .to_string();
        let config = output
            .distribution_config()
            .cloned()
            .ok_or_else(|| ProviderError::malformed(GET_CONFIG_OP, "missing DistributionConfig"))?;

        Ok(DistributionSnapshot { etag, config })
    }

    fn update_config(
        &self,
        distribution_id: &str,
        if_match: &str,
        config: &DistributionConfig,
    ) -> Result<UpdateAck, ProviderError> {
        log::debug!(
            "{} for distribution '{}' with If-Match {}",
            UPDATE_OP,
            distribution_id,
            if_match
        );
        let status = Arc::new(Mutex::new(None));
        let observed = Arc::clone(&status);

        let output = self
            .runtime
            .block_on(
                self.cloudfront
                    .update_distribution()
                    .id(distribution_id)
                    .if_match(if_match)
                    .distribution_config(config.clone())
                    .customize()
                    .mutate_response(move |response| {
                        *observed.lock() = Some(response.status().as_u16());
                    })
                    .send(),
            )
            .map_err(|err| {
                classify(
                    UPDATE_OP,
                    &distribution_resource(distribution_id),
                    self.timeout,
                    err,
                )
            })?;

        let status_code = status
            .lock()
            .take()
            .ok_or_else(|| ProviderError::malformed(UPDATE_OP, "no HTTP status was received"))?;

        Ok(UpdateAck {
            status_code,
            etag: output.e_tag().map(str::to_string),
            deployment_status: output
                .distribution()
                .and_then(|distribution| shapes::text(&distribution.status)),
        })
    }
}

impl FunctionVersionsApi for AwsSdk {
    fn list_versions(&self, function_name: &str) -> Result<Vec<FunctionVersion>, ProviderError> {
        log::debug!("{} for function '{}'", LIST_VERSIONS_OP, function_name);
        let resource = format!("function '{}'", function_name);

        self.runtime.block_on(async {
            let mut entries = self
                .lambda
                .list_versions_by_function()
                .function_name(function_name)
                .into_paginator()
                .items()
                .send();

            let mut versions = Vec::new();
            while let Some(entry) = entries.next().await {
                let entry =
                    entry.map_err(|err| classify(LIST_VERSIONS_OP, &resource, self.timeout, err))?;
                match (entry.version(), entry.function_arn()) {
                    (Some(version), Some(arn)) => versions.push(FunctionVersion {
                        version: version.to_string(),
                        function_arn: arn.to_string(),
                    }),
                    _ => {
                        return Err(ProviderError::malformed(
                            LIST_VERSIONS_OP,
                            "version entry without Version/FunctionArn",
                        ));
                    }
                }
            }
            Ok(versions)
        })
    }
}

fn distribution_resource(id: &str) -> String {
    format!("distribution '{}'", id)
}

/// Service errors that map to something other than a generic failure.
trait ServiceFailure: ProvideErrorMetadata {
    fn is_not_found(&self) -> bool;

    fn is_stale_token(&self) -> bool {
        false
    }
}

impl ServiceFailure for GetDistributionConfigError {
    fn is_not_found(&self) -> bool {
        self.is_no_such_distribution()
    }
}

impl ServiceFailure for UpdateDistributionError {
    fn is_not_found(&self) -> bool {
        self.is_no_such_distribution()
    }

    fn is_stale_token(&self) -> bool {
        self.is_precondition_failed()
    }
}

impl ServiceFailure for ListVersionsByFunctionError {
    fn is_not_found(&self) -> bool {
        self.is_resource_not_found_exception()
    }
}

fn classify<E, R>(
    operation: &str,
    resource: &str,
    timeout: Duration,
    err: SdkError<E, R>,
) -> ProviderError
where
    E: ServiceFailure + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let details = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) => ProviderError::Timeout {
            operation: operation.to_string(),
            secs: timeout.as_secs(),
        },
        SdkError::ServiceError(context) => {
            let service = context.err();
            if service.is_stale_token() {
                ProviderError::PreconditionFailed {
                    operation: operation.to_string(),
                    details,
                }
            } else if service.is_not_found() {
                ProviderError::NotFound {
                    operation: operation.to_string(),
                    resource: resource.to_string(),
                    details,
                }
            } else {
                ProviderError::Failed {
                    operation: operation.to_string(),
                    code: service.code().unwrap_or("Unknown").to_string(),
                    details,
                }
            }
        }
        SdkError::ResponseError(_) => ProviderError::malformed(operation, details),
        _ => ProviderError::Unreachable {
            operation: operation.to_string(),
            details,
        },
    }
}
