//! Pins a cache behavior's Lambda@Edge associations to their latest versions.

use crate::error::SyncError;
use crate::versions::{FunctionVersionRef, VersionResolver};
use edgepin_config::CacheBehaviorConfig;
use std::collections::HashSet;
use std::fmt;

/// CloudFront trigger points a function can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    ViewerRequest,
    ViewerResponse,
    OriginRequest,
    OriginResponse,
}

impl Trigger {
    /// Parse a CloudFront `EventType` value
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        match event_type {
            "viewer-request" => Some(Trigger::ViewerRequest),
            "viewer-response" => Some(Trigger::ViewerResponse),
            "origin-request" => Some(Trigger::OriginRequest),
            "origin-response" => Some(Trigger::OriginResponse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::ViewerRequest => "viewer-request",
            Trigger::ViewerResponse => "viewer-response",
            Trigger::OriginRequest => "origin-request",
            Trigger::OriginResponse => "origin-response",
        }
    }

    /// Whether associations on this trigger are pinned to the latest version.
    pub fn pins_latest(&self) -> bool {
        match self {
            Trigger::ViewerRequest | Trigger::OriginResponse => true,
            Trigger::ViewerResponse | Trigger::OriginRequest => false,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One substitution made by [`AssociationUpdater::resolve_latest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAssociation {
    pub trigger: Trigger,
    pub previous: String,
    pub resolved: String,
}

impl ResolvedAssociation {
    pub fn changed(&self) -> bool {
        self.previous != self.resolved
    }
}

/// Output of a resolution pass: the rewritten behavior and what was resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub cache_behavior: CacheBehaviorConfig,
    pub resolved: Vec<ResolvedAssociation>,
}

pub struct AssociationUpdater<'a> {
    resolver: VersionResolver<'a>,
}

impl<'a> AssociationUpdater<'a> {
    pub fn new(resolver: VersionResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Rewrite every pinned association to the latest published version.
    ///
    /// All references are validated before the first provider call, and the
    /// input is never modified, so a failure leaves nothing half-substituted.
    pub fn resolve_latest(&self, behavior: &CacheBehaviorConfig) -> Result<Resolution, SyncError> {
        let targets = pinned_targets(behavior)?;

        let mut updated = behavior.clone();
        let mut resolved = Vec::with_capacity(targets.len());
        let associations = updated.associations_mut();

        for (index, trigger, reference) in targets {
            let latest = self.resolver.latest_version(reference.function_name())?;
            let new_ref = reference.with_version(&latest.version).to_string();

            let association = &mut associations[index];
            resolved.push(ResolvedAssociation {
                trigger,
                previous: std::mem::replace(&mut association.lambda_function_arn, new_ref.clone()),
                resolved: new_ref,
            });
        }

        Ok(Resolution {
            cache_behavior: updated,
            resolved,
        })
    }
}

/// Index, trigger and parsed reference of every association to resolve.
fn pinned_targets(
    behavior: &CacheBehaviorConfig,
) -> Result<Vec<(usize, Trigger, FunctionVersionRef)>, SyncError> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for (index, association) in behavior.associations().iter().enumerate() {
        let Some(trigger) = Trigger::from_event_type(&association.event_type) else {
            log::debug!(
                "Leaving association with unknown event type '{}' as is",
                association.event_type
            );
            continue;
        };
        if !trigger.pins_latest() {
            continue;
        }
        if !seen.insert(trigger) {
            return Err(SyncError::InvalidConfig(format!(
                "more than one association uses the '{}' trigger",
                trigger
            )));
        }
        let reference = FunctionVersionRef::parse(&association.lambda_function_arn)?;
        targets.push((index, trigger, reference));
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_round_trip() {
        for trigger in [
            Trigger::ViewerRequest,
            Trigger::ViewerResponse,
            Trigger::OriginRequest,
            Trigger::OriginResponse,
        ] {
            assert_eq!(Trigger::from_event_type(trigger.as_str()), Some(trigger));
        }
        assert_eq!(Trigger::from_event_type("Viewer-Request"), None);
    }

    #[test]
    fn test_pinned_triggers() {
        assert!(Trigger::ViewerRequest.pins_latest());
        assert!(Trigger::OriginResponse.pins_latest());
        assert!(!Trigger::ViewerResponse.pins_latest());
        assert!(!Trigger::OriginRequest.pins_latest());
    }

    #[test]
    fn test_resolved_association_changed() {
        let same = ResolvedAssociation {
            trigger: Trigger::ViewerRequest,
            previous: "fn:1".to_string(),
            resolved: "fn:1".to_string(),
        };
        assert!(!same.changed());
    }
}
