//! Merges a local cache behavior into the live distribution config.
//!
//! The remote config is always fetched fresh and submitted with the ETag from
//! that same fetch. Only `CacheBehaviors.Items[0]` is ever replaced; every
//! other part of the fetched config goes back exactly as received.

use crate::error::SyncError;
use edgepin_config::CacheBehaviorConfig;
use edgepin_provider::shapes::{self, FromJson};
use edgepin_provider::{CacheBehavior, DistributionApi, DistributionConfig, DistributionSnapshot};

/// Key of the cache behavior in a stage block, used in error messages.
const BEHAVIOR_KEY: &str = "CacheBehavior_1";

/// Outcome of a submitted update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResult {
    /// HTTP status of the update response
    pub status_code: u16,
    /// ETag that was sent as If-Match
    pub submitted_etag: String,
    /// ETag after the update, if returned
    pub new_etag: Option<String>,
    pub deployment_status: Option<String>,
}

pub struct DistributionReconciler<'a> {
    api: &'a dyn DistributionApi,
}

impl<'a> DistributionReconciler<'a> {
    pub fn new(api: &'a dyn DistributionApi) -> Self {
        Self { api }
    }

    /// Fetch the full remote config and its ETag.
    pub fn fetch(&self, distribution_id: &str) -> Result<DistributionSnapshot, SyncError> {
        let snapshot = self.api.get_config(distribution_id)?;
        log::debug!(
            "Fetched distribution {} (ETag {})",
            distribution_id,
            snapshot.etag
        );
        Ok(snapshot)
    }

    /// Put `behavior` into slot 0 of the remote config and submit it.
    ///
    /// The stage block is checked before anything is fetched. A stale ETag
    /// fails with [`SyncError::Conflict`]; there is no retry.
    pub fn apply(
        &self,
        distribution_id: &str,
        behavior: &CacheBehaviorConfig,
    ) -> Result<UpdateResult, SyncError> {
        let behavior = to_cache_behavior(behavior)?;
        let DistributionSnapshot { etag, mut config } = self.fetch(distribution_id)?;

        merge_cache_behavior(&mut config, behavior)?;

        log::info!(
            "Submitting distribution {} with If-Match {}",
            distribution_id,
            etag
        );
        let ack = self.api.update_config(distribution_id, &etag, &config)?;

        Ok(UpdateResult {
            status_code: ack.status_code,
            submitted_etag: etag,
            new_etag: ack.etag,
            deployment_status: ack.deployment_status,
        })
    }
}

/// Convert a stage's cache behavior block into the provider's type.
pub fn to_cache_behavior(behavior: &CacheBehaviorConfig) -> Result<CacheBehavior, SyncError> {
    let value = serde_json::to_value(behavior).map_err(|e| {
        SyncError::InvalidConfig(format!("{} cannot be serialized: {}", BEHAVIOR_KEY, e))
    })?;
    CacheBehavior::from_json(&value, BEHAVIOR_KEY)
        .map_err(|e| SyncError::InvalidConfig(e.to_string()))
}

/// Replace `CacheBehaviors.Items[0]` with `behavior`.
///
/// A missing or empty collection becomes a single slot with `Quantity: 1`.
/// Other slots, an existing `Quantity`, and every other field are left as
/// they are.
pub fn merge_cache_behavior(
    config: &mut DistributionConfig,
    behavior: CacheBehavior,
) -> Result<(), SyncError> {
    let first_slot = config
        .cache_behaviors
        .as_mut()
        .and_then(|collection| collection.items.as_mut())
        .and_then(|items| items.first_mut());
    if let Some(slot) = first_slot {
        *slot = behavior;
        return Ok(());
    }

    let collection = shapes::cache_behaviors(vec![behavior])
        .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
    config.cache_behaviors = Some(collection);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn config(value: Value) -> DistributionConfig {
        shapes::from_json(&value, "DistributionConfig").unwrap()
    }

    fn base(cache_behaviors: Option<Value>) -> DistributionConfig {
        let mut value = json!({
            "CallerReference": "ref",
            "Origins": {"Quantity": 1, "Items": [{"Id": "o", "DomainName": "o.example.com"}]},
            "DefaultCacheBehavior": {"TargetOriginId": "o", "ViewerProtocolPolicy": "allow-all"},
            "Comment": "images",
            "Enabled": true
        });
        if let Some(collection) = cache_behaviors {
            value["CacheBehaviors"] = collection;
        }
        config(value)
    }

    fn behavior(path: &str) -> Value {
        json!({"PathPattern": path, "TargetOriginId": "o", "ViewerProtocolPolicy": "allow-all"})
    }

    fn typed(path: &str) -> CacheBehavior {
        shapes::from_json(&behavior(path), "CacheBehavior").unwrap()
    }

    #[test]
    fn test_merge_into_empty_collection() {
        let mut config = base(Some(json!({"Quantity": 0, "Items": []})));
        merge_cache_behavior(&mut config, typed("/img/*")).unwrap();

        let rendered = shapes::to_json(&config);
        assert_eq!(
            rendered["CacheBehaviors"],
            json!({"Quantity": 1, "Items": [behavior("/img/*")]})
        );
        assert_eq!(rendered["Comment"], "images");
    }

    #[test]
    fn test_merge_into_missing_collection() {
        let mut config = base(None);
        merge_cache_behavior(&mut config, typed("/img/*")).unwrap();
        assert_eq!(
            shapes::to_json(&config)["CacheBehaviors"],
            json!({"Quantity": 1, "Items": [behavior("/img/*")]})
        );
    }

    #[test]
    fn test_merge_quantity_without_items() {
        let mut config = base(Some(json!({"Quantity": 0})));
        merge_cache_behavior(&mut config, typed("/a")).unwrap();
        let rendered = shapes::to_json(&config);
        assert_eq!(rendered["CacheBehaviors"]["Quantity"], 1);
        assert_eq!(rendered["CacheBehaviors"]["Items"][0]["PathPattern"], "/a");
    }

    #[test]
    fn test_merge_replaces_only_first_slot() {
        let mut config = base(Some(json!({
            "Quantity": 2,
            "Items": [behavior("/old"), behavior("/keep")]
        })));
        merge_cache_behavior(&mut config, typed("/new")).unwrap();
        assert_eq!(
            shapes::to_json(&config)["CacheBehaviors"],
            json!({"Quantity": 2, "Items": [behavior("/new"), behavior("/keep")]})
        );
    }

    #[test]
    fn test_merge_keeps_unrelated_fields() {
        let before = base(Some(json!({"Quantity": 1, "Items": [behavior("/old")]})));
        let mut after = before.clone();
        merge_cache_behavior(&mut after, typed("/new")).unwrap();

        let (mut before, mut after) = (shapes::to_json(&before), shapes::to_json(&after));
        before.as_object_mut().unwrap().remove("CacheBehaviors");
        after.as_object_mut().unwrap().remove("CacheBehaviors");
        assert_eq!(before, after);
    }

    #[test]
    fn test_stage_block_with_unsupported_field_is_invalid() {
        let block: CacheBehaviorConfig = serde_json::from_value(json!({
            "PathPattern": "/img/*",
            "TargetOriginId": "o",
            "ViewerProtocolPolicy": "allow-all",
            "Colour": "blue"
        }))
        .unwrap();

        let err = to_cache_behavior(&block).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(ref msg) if msg.contains("Colour")), "{err}");
    }
}
