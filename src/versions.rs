//! Function version references and latest-version resolution.

use crate::error::SyncError;
use edgepin_provider::{FunctionVersion, FunctionVersionsApi};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// Lambda's mutable pseudo-version; never a published version.
pub const UNPUBLISHED_VERSION: &str = "$LATEST";

/// A qualified function reference: `<prefix>:<function name>:<version>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionVersionRef {
    /// Everything before the final `:`
    unqualified: String,
    version: String,
}

impl FunctionVersionRef {
    /// Split a qualified ARN into its function part and version.
    pub fn parse(reference: &str) -> Result<Self, SyncError> {
        let invalid = |why: &str| {
            SyncError::InvalidConfig(format!("function reference '{}' {}", reference, why))
        };

        let (unqualified, version) = reference
            .rsplit_once(':')
            .ok_or_else(|| invalid("has no ':' separators"))?;
        if version.is_empty() {
            return Err(invalid("has an empty version"));
        }

        let name = unqualified.rsplit(':').next().unwrap_or_default();
        if name.is_empty() {
            return Err(invalid("has no function name before the version"));
        }
        // An unqualified ARN ends in `:function:<name>`
        if name == "function" {
            return Err(invalid("is not qualified with a version"));
        }

        Ok(Self {
            unqualified: unqualified.to_string(),
            version: version.to_string(),
        })
    }

    /// Function name (second-to-last segment)
    pub fn function_name(&self) -> &str {
        self.unqualified.rsplit(':').next().unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Same function, different version
    pub fn with_version(&self, version: &str) -> Self {
        Self {
            unqualified: self.unqualified.clone(),
            version: version.to_string(),
        }
    }
}

impl fmt::Display for FunctionVersionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unqualified, self.version)
    }
}

/// Sort key for a version marker. Variant order is significant: any parsable
/// release outranks an opaque marker.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum MarkerKey<'a> {
    Opaque(&'a str),
    Release(Version),
}

fn marker_key(marker: &str) -> MarkerKey<'_> {
    if let Ok(n) = marker.parse::<u64>() {
        return MarkerKey::Release(Version::new(n, 0, 0));
    }
    let trimmed = marker.strip_prefix('v').unwrap_or(marker);
    match Version::parse(trimmed) {
        Ok(v) => MarkerKey::Release(v),
        Err(_) => MarkerKey::Opaque(marker),
    }
}

/// Order two version markers: integers numerically, then semver precedence,
/// then plain string order for anything else.
pub fn compare_markers(a: &str, b: &str) -> Ordering {
    marker_key(a).cmp(&marker_key(b))
}

/// Pick the greatest published version. On ties the earlier entry wins.
pub fn select_latest(versions: &[FunctionVersion]) -> Option<&FunctionVersion> {
    versions
        .iter()
        .filter(|v| v.version != UNPUBLISHED_VERSION)
        .fold(None, |best: Option<&FunctionVersion>, candidate| match best {
            Some(current)
                if compare_markers(&candidate.version, &current.version) != Ordering::Greater =>
            {
                Some(current)
            }
            _ => Some(candidate),
        })
}

/// Resolves the newest published version of a function.
pub struct VersionResolver<'a> {
    api: &'a dyn FunctionVersionsApi,
}

impl<'a> VersionResolver<'a> {
    pub fn new(api: &'a dyn FunctionVersionsApi) -> Self {
        Self { api }
    }

    /// List every version of `function_name` and return the latest published one.
    pub fn latest_version(&self, function_name: &str) -> Result<FunctionVersion, SyncError> {
        let versions = self.api.list_versions(function_name)?;
        log::debug!(
            "Function '{}' has {} version(s) listed",
            function_name,
            versions.len()
        );

        let latest = select_latest(&versions).ok_or_else(|| {
            SyncError::NotFound(format!(
                "function '{}' has no published versions",
                function_name
            ))
        })?;

        log::info!("Latest version of '{}' is {}", function_name, latest.version);
        Ok(latest.clone())
    }
}
