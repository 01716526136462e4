//! Shared integration test helpers for edgepin.
//!
//! Provides recording fakes for the provider traits and stage store fixtures
//! backed by a temp directory.
//!
//! ```ignore
//! mod common;
//! use common::{FakeDistributions, FakeVersions, store_with_stages};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per test file.

#![allow(dead_code)]

use edgepin::merge_cache_behavior;
use edgepin_config::StageConfigStore;
use edgepin_provider::shapes;
use edgepin_provider::{
    CacheBehavior, DistributionApi, DistributionConfig, DistributionSnapshot, FunctionVersion,
    FunctionVersionsApi, ProviderError, UpdateAck,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const DEV_DISTRIBUTION: &str = "EDEV111111";
pub const PROD_DISTRIBUTION: &str = "EPROD22222";

/// Qualified ARN for `name` at `version`.
pub fn arn(name: &str, version: &str) -> String {
    format!("arn:aws:lambda:us-east-1:123456789012:function:{}:{}", name, version)
}

/// A stage block with viewer-request and origin-response associations.
pub fn stage_block(distribution_id: &str, viewer: &str, origin: &str) -> Value {
    json!({
        "DistributionId": distribution_id,
        "CacheBehavior_1": {
            "PathPattern": "/images/*",
            "TargetOriginId": "image-origin",
            "ViewerProtocolPolicy": "redirect-to-https",
            "LambdaFunctionAssociations": {
                "Quantity": 2,
                "Items": [
                    {"EventType": "viewer-request", "LambdaFunctionARN": viewer, "IncludeBody": false},
                    {"EventType": "origin-response", "LambdaFunctionARN": origin, "IncludeBody": false}
                ]
            }
        }
    })
}

/// The usual two-stage store document.
pub fn default_document() -> Value {
    json!({
        "dev": stage_block(DEV_DISTRIBUTION, &arn("fn-A", "3"), &arn("fn-B", "1")),
        "prod": stage_block(PROD_DISTRIBUTION, &arn("fn-A", "2"), &arn("fn-B", "1")),
    })
}

/// Write `document` to a store file inside a fresh temp dir.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn store_with_document(document: &Value) -> (StageConfigStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("image_flex_config.json");
    fs::write(
        &path,
        serde_json::to_string_pretty(document).expect("Failed to serialize document"),
    )
    .expect("Failed to write store");
    (StageConfigStore::new(path), temp_dir)
}

pub fn store_with_stages() -> (StageConfigStore, TempDir) {
    store_with_document(&default_document())
}

/// Re-read the whole store file as JSON.
pub fn read_document(path: &std::path::Path) -> Value {
    let text = fs::read_to_string(path).expect("Failed to read store");
    serde_json::from_str(&text).expect("Store is not JSON")
}

/// A live distribution config with unrelated fields around `CacheBehaviors`.
pub fn remote_config() -> Map<String, Value> {
    let value = json!({
        "CallerReference": "image-flex-1",
        "Aliases": {"Quantity": 1, "Items": ["img.example.com"]},
        "DefaultRootObject": "",
        "Origins": {"Quantity": 1, "Items": [{"Id": "image-origin", "DomainName": "bucket.s3.amazonaws.com"}]},
        "DefaultCacheBehavior": {"TargetOriginId": "image-origin", "ViewerProtocolPolicy": "allow-all"},
        "CacheBehaviors": {
            "Quantity": 2,
            "Items": [
                {"PathPattern": "/images/*", "TargetOriginId": "image-origin", "ViewerProtocolPolicy": "allow-all"},
                {"PathPattern": "/static/*", "TargetOriginId": "image-origin", "ViewerProtocolPolicy": "allow-all"}
            ]
        },
        "Comment": "image flex",
        "Enabled": true
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Typed config from API-shaped JSON.
pub fn typed_config(config: &Map<String, Value>) -> DistributionConfig {
    shapes::from_json(&Value::Object(config.clone()), "DistributionConfig")
        .expect("fixture is not a valid DistributionConfig")
}

/// API-shaped JSON of a typed config.
pub fn json_config(config: &DistributionConfig) -> Map<String, Value> {
    match shapes::to_json(config) {
        Value::Object(map) => map,
        other => panic!("config rendered as {other}"),
    }
}

/// In-memory distribution service that records every call.
///
/// Each accepted update rotates the ETag. With `concurrent_edit` set, every
/// fetch is followed by a simulated outside edit, so the next submit is stale.
pub struct FakeDistributions {
    configs: Mutex<HashMap<String, (String, DistributionConfig)>>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(String, String, DistributionConfig)>>,
    revision: Mutex<u32>,
    pub concurrent_edit: bool,
}

impl FakeDistributions {
    pub fn new() -> Self {
        Self {
            configs: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            revision: Mutex::new(1),
            concurrent_edit: false,
        }
    }

    pub fn with_distribution(self, id: &str, config: Map<String, Value>) -> Self {
        self.configs
            .lock()
            .insert(id.to_string(), (format!("ETAG{}", id), typed_config(&config)));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// `(distribution id, If-Match, config)` of every submit, accepted or not
    pub fn submitted(&self) -> Vec<(String, String, Map<String, Value>)> {
        self.submitted
            .lock()
            .iter()
            .map(|(id, etag, config)| (id.clone(), etag.clone(), json_config(config)))
            .collect()
    }

    pub fn current(&self, id: &str) -> Option<(String, Map<String, Value>)> {
        self.configs
            .lock()
            .get(id)
            .map(|(etag, config)| (etag.clone(), json_config(config)))
    }

    fn next_etag(&self) -> String {
        let mut revision = self.revision.lock();
        *revision += 1;
        format!("ETAG-R{}", *revision)
    }
}

impl DistributionApi for FakeDistributions {
    fn get_config(&self, distribution_id: &str) -> Result<DistributionSnapshot, ProviderError> {
        self.calls.lock().push(format!("get_config {}", distribution_id));

        let snapshot = {
            let configs = self.configs.lock();
            let (etag, config) =
                configs
                    .get(distribution_id)
                    .ok_or_else(|| ProviderError::NotFound {
                        operation: "cloudfront GetDistributionConfig".to_string(),
                        resource: format!("distribution {}", distribution_id),
                        details: "NoSuchDistribution".to_string(),
                    })?;
            DistributionSnapshot {
                etag: etag.clone(),
                config: config.clone(),
            }
        };

        if self.concurrent_edit {
            let etag = self.next_etag();
            if let Some(entry) = self.configs.lock().get_mut(distribution_id) {
                let mut edited = json_config(&entry.1);
                edited.insert("Comment".to_string(), json!("edited elsewhere"));
                *entry = (etag, typed_config(&edited));
            }
        }
        Ok(snapshot)
    }

    fn update_config(
        &self,
        distribution_id: &str,
        if_match: &str,
        config: &DistributionConfig,
    ) -> Result<UpdateAck, ProviderError> {
        self.calls
            .lock()
            .push(format!("update_config {} {}", distribution_id, if_match));
        self.submitted.lock().push((
            distribution_id.to_string(),
            if_match.to_string(),
            config.clone(),
        ));

        let new_etag = self.next_etag();
        let mut configs = self.configs.lock();
        let entry = configs
            .get_mut(distribution_id)
            .ok_or_else(|| ProviderError::NotFound {
                operation: "cloudfront UpdateDistribution".to_string(),
                resource: format!("distribution {}", distribution_id),
                details: "NoSuchDistribution".to_string(),
            })?;
        if entry.0 != if_match {
            return Err(ProviderError::PreconditionFailed {
                operation: "cloudfront UpdateDistribution".to_string(),
                details: format!("If-Match {} does not match {}", if_match, entry.0),
            });
        }
        *entry = (new_etag.clone(), config.clone());

        Ok(UpdateAck {
            status_code: 200,
            etag: Some(new_etag),
            deployment_status: Some("InProgress".to_string()),
        })
    }
}

/// In-memory version listing that records every call.
pub struct FakeVersions {
    versions: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeVersions {
    pub fn new() -> Self {
        Self {
            versions: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Register `name` with version markers in provider order.
    pub fn with_function(mut self, name: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl FunctionVersionsApi for FakeVersions {
    fn list_versions(&self, function_name: &str) -> Result<Vec<FunctionVersion>, ProviderError> {
        self.calls.lock().push(function_name.to_string());
        let versions = self
            .versions
            .get(function_name)
            .ok_or_else(|| ProviderError::NotFound {
                operation: "lambda ListVersionsByFunction".to_string(),
                resource: format!("function {}", function_name),
                details: "ResourceNotFoundException".to_string(),
            })?;
        Ok(versions
            .iter()
            .map(|version| FunctionVersion {
                version: version.clone(),
                function_arn: arn(function_name, version),
            })
            .collect())
    }
}

/// Expected remote config after merging `behavior` into [`remote_config`].
pub fn expected_after_merge(behavior: Value) -> Map<String, Value> {
    let mut expected = typed_config(&remote_config());
    let behavior: CacheBehavior =
        shapes::from_json(&behavior, "CacheBehavior_1").expect("behavior fixture is invalid");
    merge_cache_behavior(&mut expected, behavior).expect("merge failed");
    json_config(&expected)
}

/// Path of the store file, for assertions that re-read it.
pub fn store_path(store: &StageConfigStore) -> PathBuf {
    store.path().to_path_buf()
}
