//! Typed error variants for the edgepin-config crate.
//!
//! Callers at the crate boundary match on these instead of parsing strings;
//! the binary folds them into its own error kinds.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing the stage store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be read.
    #[error("Failed to read stage store '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not valid JSON, or its top level is not an object.
    #[error("Stage store '{path}' is not well-formed: {details}")]
    Malformed { path: PathBuf, details: String },

    /// The stage block exists but does not have the expected shape.
    #[error("Stage '{stage}' in '{path}' has an invalid shape: {source}")]
    InvalidStage {
        stage: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The requested stage has no block in the store.
    #[error("Stage '{stage}' not found in '{path}'")]
    StageNotFound { stage: String, path: PathBuf },

    /// The in-memory document could not be serialized.
    #[error("Failed to serialize stage store: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Writing the temp file or renaming it into place failed.
    #[error("Failed to write stage store '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from loading the optional settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred reading the settings file.
    #[error("I/O error reading settings '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file contained invalid YAML.
    #[error("YAML parse error in settings '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// A field value failed semantic validation.
    #[error("Settings validation error: {0}")]
    Validation(String),
}
