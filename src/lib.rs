// Library exports for testing and potential library use
//
// Pipeline layout:
//
//   - `versions`      - parses qualified function ARNs and picks the latest
//                       published version from a provider listing.
//   - `associations`  - rewrites the pinned edge triggers of a cache behavior
//                       to their latest versions.
//   - `reconciler`    - merges a cache behavior into the live distribution
//                       config and submits it under the fetched ETag.
//   - `view`          - read-only rendering of the live config.
//   - `commands`      - the `update` / `view` pipelines and their output.

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod associations;
pub mod cli;
pub mod commands;
pub mod debug;
pub mod error;
pub mod reconciler;
pub mod versions;
pub mod view;

pub use associations::{AssociationUpdater, Resolution, ResolvedAssociation, Trigger};
pub use commands::{Style, UpdateReport, run_update, run_view};
pub use error::SyncError;
pub use reconciler::{DistributionReconciler, UpdateResult, merge_cache_behavior, to_cache_behavior};
pub use versions::{FunctionVersionRef, VersionResolver, select_latest};
pub use view::{RemoteView, ViewCommand};
