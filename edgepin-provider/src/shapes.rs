//! CloudFront SDK types to and from their API-shaped JSON.
//!
//! The stage store and the `view` output use the PascalCase layout of the
//! CloudFront API, `{"Quantity": n, "Items": [...]}` wrappers included. Each
//! shape below lists its members once and both directions are generated
//! from that table. Decoding rejects members a shape does not list, so a
//! stage block never loses a field on its way to the provider.

use aws_sdk_cloudfront::error::BuildError;
use aws_sdk_cloudfront::types::{
    Aliases, AllowedMethods, CacheBehavior, CacheBehaviors, CachedMethods, CookieNames,
    CookiePreference, CustomErrorResponse, CustomErrorResponses, CustomHeaders,
    CustomOriginConfig, DefaultCacheBehavior, DistributionConfig, EventType, ForwardedValues,
    FunctionAssociation, FunctionAssociations, GeoRestriction, GeoRestrictionType, Headers,
    HttpVersion, ItemSelection, LambdaFunctionAssociation, LambdaFunctionAssociations,
    LoggingConfig, Method, MinimumProtocolVersion, Origin, OriginCustomHeader, OriginGroup,
    OriginGroupFailoverCriteria, OriginGroupMember, OriginGroupMembers, OriginGroups,
    OriginProtocolPolicy, OriginShield, OriginSslProtocols, Origins, PriceClass,
    QueryStringCacheKeys, Restrictions, S3OriginConfig, SslProtocol, SslSupportMethod,
    StatusCodes, TrustedKeyGroups, TrustedSigners, ViewerCertificate, ViewerProtocolPolicy,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// Why a JSON document could not become an SDK value.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("{path}: expected {expected}")]
    WrongType { path: String, expected: &'static str },

    #[error("{path}: unsupported field '{field}'")]
    UnknownField { path: String, field: String },

    #[error("{path}: '{value}' is not an accepted value")]
    UnknownValue { path: String, value: String },

    /// A required member is missing.
    #[error("{path}: {source}")]
    Incomplete {
        path: String,
        #[source]
        source: BuildError,
    },
}

/// Render as API-shaped JSON. Absent members are omitted.
pub trait ToJson {
    fn to_json(&self) -> Value;
}

/// Build from API-shaped JSON; `path` locates the value in error messages.
pub trait FromJson: Sized {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError>;
}

/// Render any supported SDK value.
pub fn to_json<T: ToJson + ?Sized>(value: &T) -> Value {
    value.to_json()
}

/// Build any supported SDK value, naming it `root` in errors.
pub fn from_json<T: FromJson>(value: &Value, root: &str) -> Result<T, ShapeError> {
    T::from_json(value, root)
}

/// A `CacheBehaviors` collection holding exactly `items`.
pub fn cache_behaviors(items: Vec<CacheBehavior>) -> Result<CacheBehaviors, ShapeError> {
    let quantity = i32::try_from(items.len()).map_err(|_| ShapeError::WrongType {
        path: "CacheBehaviors.Quantity".to_string(),
        expected: "a 32-bit count",
    })?;
    CacheBehaviors::builder()
        .quantity(quantity)
        .set_items(Some(items))
        .build()
        .finish("CacheBehaviors")
}

/// Text of a string member, whether the SDK models it as required or optional.
pub(crate) fn text<T: ToJson>(value: &T) -> Option<String> {
    value.to_json().as_str().map(str::to_string)
}

/// Normalizes `build()` across shapes with and without required members.
trait Finish {
    type Output;
    fn finish(self, path: &str) -> Result<Self::Output, ShapeError>;
}

impl<T> Finish for Result<T, BuildError> {
    type Output = T;

    fn finish(self, path: &str) -> Result<T, ShapeError> {
        self.map_err(|source| ShapeError::Incomplete {
            path: path.to_string(),
            source,
        })
    }
}

fn wrong_type(path: &str, expected: &'static str) -> ShapeError {
    ShapeError::WrongType {
        path: path.to_string(),
        expected,
    }
}

fn object<'a>(
    value: &'a Value,
    path: &str,
    known: &[&str],
) -> Result<&'a Map<String, Value>, ShapeError> {
    let map = value.as_object().ok_or_else(|| wrong_type(path, "an object"))?;
    if let Some(field) = map.keys().find(|key| !known.contains(&key.as_str())) {
        return Err(ShapeError::UnknownField {
            path: path.to_string(),
            field: field.clone(),
        });
    }
    Ok(map)
}

fn member<T: FromJson>(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<T>, ShapeError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::from_json(value, &format!("{}.{}", path, key)).map(Some),
    }
}

fn put<T: ToJson>(map: &mut Map<String, Value>, key: &str, value: &T) {
    let value = value.to_json();
    if !value.is_null() {
        map.insert(key.to_string(), value);
    }
}

impl ToJson for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToJson for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToJson for i32 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl ToJson for i64 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToJson::to_json)
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl FromJson for String {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| wrong_type(path, "a string"))
    }
}

impl FromJson for bool {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
        value.as_bool().ok_or_else(|| wrong_type(path, "a boolean"))
    }
}

impl FromJson for i32 {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
        value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(|| wrong_type(path, "a 32-bit integer"))
    }
}

impl FromJson for i64 {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
        value.as_i64().ok_or_else(|| wrong_type(path, "an integer"))
    }
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
        value
            .as_array()
            .ok_or_else(|| wrong_type(path, "an array"))?
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_json(item, &format!("{}[{}]", path, index)))
            .collect()
    }
}

macro_rules! enum_shape {
    ($($name:ident),* $(,)?) => {$(
        impl ToJson for $name {
            fn to_json(&self) -> Value {
                Value::String(self.as_str().to_string())
            }
        }

        impl FromJson for $name {
            fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
                let text = String::from_json(value, path)?;
                if $name::values().contains(&text.as_str()) {
                    Ok($name::from(text.as_str()))
                } else {
                    Err(ShapeError::UnknownValue {
                        path: path.to_string(),
                        value: text,
                    })
                }
            }
        }
    )*};
}

macro_rules! shape {
    ($name:ident { $($key:literal => $field:ident / $setter:ident),* $(,)? }) => {
        // TTLs and ForwardedValues are deprecated in favour of cache policies
        // but still live on older distributions
        #[allow(deprecated)]
        impl ToJson for $name {
            fn to_json(&self) -> Value {
                let mut map = Map::new();
                $(put(&mut map, $key, &self.$field);)*
                Value::Object(map)
            }
        }

        #[allow(deprecated)]
        impl FromJson for $name {
            fn from_json(value: &Value, path: &str) -> Result<Self, ShapeError> {
                let map = object(value, path, &[$($key),*])?;
                $name::builder()
                    $(.$setter(member(map, $key, path)?))*
                    .build()
                    .finish(path)
            }
        }

        impl Finish for $name {
            type Output = $name;

            fn finish(self, _path: &str) -> Result<$name, ShapeError> {
                Ok(self)
            }
        }
    };
}

enum_shape!(
    EventType,
    GeoRestrictionType,
    HttpVersion,
    ItemSelection,
    Method,
    MinimumProtocolVersion,
    OriginProtocolPolicy,
    PriceClass,
    SslProtocol,
    SslSupportMethod,
    ViewerProtocolPolicy,
);

shape!(DistributionConfig {
    "CallerReference" => caller_reference / set_caller_reference,
    "Aliases" => aliases / set_aliases,
    "DefaultRootObject" => default_root_object / set_default_root_object,
    "Origins" => origins / set_origins,
    "OriginGroups" => origin_groups / set_origin_groups,
    "DefaultCacheBehavior" => default_cache_behavior / set_default_cache_behavior,
    "CacheBehaviors" => cache_behaviors / set_cache_behaviors,
    "CustomErrorResponses" => custom_error_responses / set_custom_error_responses,
    "Comment" => comment / set_comment,
    "Logging" => logging / set_logging,
    "PriceClass" => price_class / set_price_class,
    "Enabled" => enabled / set_enabled,
    "ViewerCertificate" => viewer_certificate / set_viewer_certificate,
    "Restrictions" => restrictions / set_restrictions,
    "WebACLId" => web_acl_id / set_web_acl_id,
    "HttpVersion" => http_version / set_http_version,
    "IsIPV6Enabled" => is_ipv6_enabled / set_is_ipv6_enabled,
    "ContinuousDeploymentPolicyId" => continuous_deployment_policy_id / set_continuous_deployment_policy_id,
    "Staging" => staging / set_staging,
});

shape!(Aliases {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(Origins {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(Origin {
    "Id" => id / set_id,
    "DomainName" => domain_name / set_domain_name,
    "OriginPath" => origin_path / set_origin_path,
    "CustomHeaders" => custom_headers / set_custom_headers,
    "S3OriginConfig" => s3_origin_config / set_s3_origin_config,
    "CustomOriginConfig" => custom_origin_config / set_custom_origin_config,
    "ConnectionAttempts" => connection_attempts / set_connection_attempts,
    "ConnectionTimeout" => connection_timeout / set_connection_timeout,
    "OriginShield" => origin_shield / set_origin_shield,
    "OriginAccessControlId" => origin_access_control_id / set_origin_access_control_id,
});

shape!(CustomHeaders {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(OriginCustomHeader {
    "HeaderName" => header_name / set_header_name,
    "HeaderValue" => header_value / set_header_value,
});

shape!(S3OriginConfig {
    "OriginAccessIdentity" => origin_access_identity / set_origin_access_identity,
});

shape!(CustomOriginConfig {
    "HTTPPort" => http_port / set_http_port,
    "HTTPSPort" => https_port / set_https_port,
    "OriginProtocolPolicy" => origin_protocol_policy / set_origin_protocol_policy,
    "OriginSslProtocols" => origin_ssl_protocols / set_origin_ssl_protocols,
    "OriginReadTimeout" => origin_read_timeout / set_origin_read_timeout,
    "OriginKeepaliveTimeout" => origin_keepalive_timeout / set_origin_keepalive_timeout,
});

shape!(OriginSslProtocols {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(OriginShield {
    "Enabled" => enabled / set_enabled,
    "OriginShieldRegion" => origin_shield_region / set_origin_shield_region,
});

shape!(OriginGroups {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(OriginGroup {
    "Id" => id / set_id,
    "FailoverCriteria" => failover_criteria / set_failover_criteria,
    "Members" => members / set_members,
});

shape!(OriginGroupFailoverCriteria {
    "StatusCodes" => status_codes / set_status_codes,
});

shape!(StatusCodes {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(OriginGroupMembers {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(OriginGroupMember {
    "OriginId" => origin_id / set_origin_id,
});

shape!(DefaultCacheBehavior {
    "TargetOriginId" => target_origin_id / set_target_origin_id,
    "TrustedSigners" => trusted_signers / set_trusted_signers,
    "TrustedKeyGroups" => trusted_key_groups / set_trusted_key_groups,
    "ViewerProtocolPolicy" => viewer_protocol_policy / set_viewer_protocol_policy,
    "AllowedMethods" => allowed_methods / set_allowed_methods,
    "SmoothStreaming" => smooth_streaming / set_smooth_streaming,
    "Compress" => compress / set_compress,
    "LambdaFunctionAssociations" => lambda_function_associations / set_lambda_function_associations,
    "FunctionAssociations" => function_associations / set_function_associations,
    "FieldLevelEncryptionId" => field_level_encryption_id / set_field_level_encryption_id,
    "RealtimeLogConfigArn" => realtime_log_config_arn / set_realtime_log_config_arn,
    "CachePolicyId" => cache_policy_id / set_cache_policy_id,
    "OriginRequestPolicyId" => origin_request_policy_id / set_origin_request_policy_id,
    "ResponseHeadersPolicyId" => response_headers_policy_id / set_response_headers_policy_id,
    "ForwardedValues" => forwarded_values / set_forwarded_values,
    "MinTTL" => min_ttl / set_min_ttl,
    "DefaultTTL" => default_ttl / set_default_ttl,
    "MaxTTL" => max_ttl / set_max_ttl,
});

shape!(CacheBehaviors {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(CacheBehavior {
    "PathPattern" => path_pattern / set_path_pattern,
    "TargetOriginId" => target_origin_id / set_target_origin_id,
    "TrustedSigners" => trusted_signers / set_trusted_signers,
    "TrustedKeyGroups" => trusted_key_groups / set_trusted_key_groups,
    "ViewerProtocolPolicy" => viewer_protocol_policy / set_viewer_protocol_policy,
    "AllowedMethods" => allowed_methods / set_allowed_methods,
    "SmoothStreaming" => smooth_streaming / set_smooth_streaming,
    "Compress" => compress / set_compress,
    "LambdaFunctionAssociations" => lambda_function_associations / set_lambda_function_associations,
    "FunctionAssociations" => function_associations / set_function_associations,
    "FieldLevelEncryptionId" => field_level_encryption_id / set_field_level_encryption_id,
    "RealtimeLogConfigArn" => realtime_log_config_arn / set_realtime_log_config_arn,
    "CachePolicyId" => cache_policy_id / set_cache_policy_id,
    "OriginRequestPolicyId" => origin_request_policy_id / set_origin_request_policy_id,
    "ResponseHeadersPolicyId" => response_headers_policy_id / set_response_headers_policy_id,
    "ForwardedValues" => forwarded_values / set_forwarded_values,
    "MinTTL" => min_ttl / set_min_ttl,
    "DefaultTTL" => default_ttl / set_default_ttl,
    "MaxTTL" => max_ttl / set_max_ttl,
});

shape!(TrustedSigners {
    "Enabled" => enabled / set_enabled,
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(TrustedKeyGroups {
    "Enabled" => enabled / set_enabled,
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(AllowedMethods {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
    "CachedMethods" => cached_methods / set_cached_methods,
});

shape!(CachedMethods {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(LambdaFunctionAssociations {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(LambdaFunctionAssociation {
    "LambdaFunctionARN" => lambda_function_arn / set_lambda_function_arn,
    "EventType" => event_type / set_event_type,
    "IncludeBody" => include_body / set_include_body,
});

shape!(FunctionAssociations {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(FunctionAssociation {
    "FunctionARN" => function_arn / set_function_arn,
    "EventType" => event_type / set_event_type,
});

shape!(ForwardedValues {
    "QueryString" => query_string / set_query_string,
    "Cookies" => cookies / set_cookies,
    "Headers" => headers / set_headers,
    "QueryStringCacheKeys" => query_string_cache_keys / set_query_string_cache_keys,
});

shape!(CookiePreference {
    "Forward" => forward / set_forward,
    "WhitelistedNames" => whitelisted_names / set_whitelisted_names,
});

shape!(CookieNames {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(Headers {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(QueryStringCacheKeys {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(CustomErrorResponses {
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});

shape!(CustomErrorResponse {
    "ErrorCode" => error_code / set_error_code,
    "ResponsePagePath" => response_page_path / set_response_page_path,
    "ResponseCode" => response_code / set_response_code,
    "ErrorCachingMinTTL" => error_caching_min_ttl / set_error_caching_min_ttl,
});

shape!(LoggingConfig {
    "Enabled" => enabled / set_enabled,
    "IncludeCookies" => include_cookies / set_include_cookies,
    "Bucket" => bucket / set_bucket,
    "Prefix" => prefix / set_prefix,
});

shape!(ViewerCertificate {
    "CloudFrontDefaultCertificate" => cloud_front_default_certificate / set_cloud_front_default_certificate,
    "IAMCertificateId" => iam_certificate_id / set_iam_certificate_id,
    "ACMCertificateArn" => acm_certificate_arn / set_acm_certificate_arn,
    "SSLSupportMethod" => ssl_support_method / set_ssl_support_method,
    "MinimumProtocolVersion" => minimum_protocol_version / set_minimum_protocol_version,
});

shape!(Restrictions {
    "GeoRestriction" => geo_restriction / set_geo_restriction,
});

shape!(GeoRestriction {
    "RestrictionType" => restriction_type / set_restriction_type,
    "Quantity" => quantity / set_quantity,
    "Items" => items / set_items,
});
