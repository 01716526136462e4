//! Configuration for edgepin.
//!
//! This crate provides:
//!
//! - The closed set of deployment stages and the typed view of a stage block
//! - The JSON stage store with atomic whole-file rewrites
//! - Optional YAML tool settings and their defaults

pub mod error;
pub mod settings;
pub mod stage;
pub mod store;

pub use error::{SettingsError, StoreError};
pub use settings::{LogLevel, Settings};
pub use stage::{CacheBehaviorConfig, FunctionAssociation, FunctionAssociations, Stage, StageConfig};
pub use store::{StageConfigStore, to_indented_json};
