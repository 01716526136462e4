//! Stage names and the typed view of one stage's configuration block.
//!
//! Only the fields edgepin acts on are modeled. Everything else in a block is
//! captured by `#[serde(flatten)]` maps and written back untouched; the store
//! puts every key back in its original position when saving.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A deployment stage. The set is closed; each stage owns one block in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Development distribution
    Dev,
    /// Production distribution
    Prod,
}

impl Stage {
    /// Key of this stage's block in the store file
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Prod => "prod",
        }
    }

    /// All known stages
    pub fn all() -> &'static [Stage] {
        &[Stage::Dev, Stage::Prod]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Stage::Dev),
            "prod" => Ok(Stage::Prod),
            other => Err(format!(
                "Unknown stage '{}'. Expected one of: dev, prod",
                other
            )),
        }
    }
}

/// One stage's block: the distribution it targets and the cache behavior to push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(rename = "DistributionId")]
    pub distribution_id: String,

    #[serde(rename = "CacheBehavior_1")]
    pub cache_behavior: CacheBehaviorConfig,

    /// Fields edgepin does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A cache behavior. Opaque apart from its Lambda@Edge associations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheBehaviorConfig {
    #[serde(
        rename = "LambdaFunctionAssociations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub lambda_function_associations: Option<FunctionAssociations>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CacheBehaviorConfig {
    /// Associations in declaration order (empty when the block has none)
    pub fn associations(&self) -> &[FunctionAssociation] {
        self.lambda_function_associations
            .as_ref()
            .and_then(|a| a.items.as_deref())
            .unwrap_or(&[])
    }

    /// Mutable access to the association list, if present
    pub fn associations_mut(&mut self) -> &mut [FunctionAssociation] {
        match self
            .lambda_function_associations
            .as_mut()
            .and_then(|a| a.items.as_mut())
        {
            Some(items) => items.as_mut_slice(),
            None => &mut [],
        }
    }
}

/// The `{Quantity, Items}` wrapper CloudFront uses for lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FunctionAssociations {
    #[serde(rename = "Quantity")]
    pub quantity: u32,

    #[serde(rename = "Items", default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<FunctionAssociation>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single event-type to function-version binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionAssociation {
    /// Trigger point, e.g. `viewer-request`
    #[serde(rename = "EventType")]
    pub event_type: String,

    /// Qualified function ARN (ends in `:<name>:<version>`)
    #[serde(rename = "LambdaFunctionARN")]
    pub lambda_function_arn: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
