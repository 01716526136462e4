//! The stage store: one JSON file holding a block per stage.
//!
//! Only the requested stage is ever decoded into [`StageConfig`]. Sibling
//! blocks stay as raw [`Value`]s so a save cannot reshape them. Inside the
//! saved block, new values are laid over the old ones so every key keeps
//! the position it had in the file (`serde_json` is built with
//! `preserve_order`).

use crate::error::StoreError;
use crate::stage::{Stage, StageConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default store file name, resolved against the working directory.
pub const DEFAULT_STORE_FILENAME: &str = "image_flex_config.json";

/// Environment variable that overrides the store path.
pub const STORE_PATH_ENV: &str = "EDGEPIN_STORE_PATH";

/// Serialize with four-space indentation and without escaping non-ASCII text.
pub fn to_indented_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

/// Reads and rewrites stage blocks in a single store file.
#[derive(Debug, Clone)]
pub struct StageConfigStore {
    path: PathBuf,
}

impl StageConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load one stage's block.
    pub fn load(&self, stage: Stage) -> Result<StageConfig, StoreError> {
        let mut document = self.read_document()?;
        log::info!("Loading stage '{}' from {:?}", stage, self.path);

        let block = document
            .remove(stage.as_str())
            .ok_or_else(|| StoreError::StageNotFound {
                stage: stage.to_string(),
                path: self.path.clone(),
            })?;

        serde_json::from_value(block).map_err(|source| StoreError::InvalidStage {
            stage: stage.to_string(),
            path: self.path.clone(),
            source,
        })
    }

    /// Replace one stage's block and rewrite the whole file.
    ///
    /// The new document is fully serialized before the file is touched, then
    /// written to a temp sibling and renamed into place, so readers only ever
    /// see the old or the new contents.
    pub fn save(&self, stage: Stage, config: &StageConfig) -> Result<(), StoreError> {
        let mut document = self.read_document()?;

        let slot = document
            .get_mut(stage.as_str())
            .ok_or_else(|| StoreError::StageNotFound {
                stage: stage.to_string(),
                path: self.path.clone(),
            })?;
        overlay(slot, serde_json::to_value(config).map_err(StoreError::Serialize)?);

        let bytes = to_indented_json(&document).map_err(StoreError::Serialize)?;
        self.write_atomic(&bytes)?;

        log::info!("Saved stage '{}' to {:?}", stage, self.path);
        Ok(())
    }

    fn read_document(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Malformed {
                path: self.path.clone(),
                details: format!("expected a JSON object at top level, found {}", kind(&other)),
            }),
            Err(e) => Err(StoreError::Malformed {
                path: self.path.clone(),
                details: e.to_string(),
            }),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let temp_path = self.path.with_extension("json.tmp");
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        {
            let mut file = fs::File::create(&temp_path).map_err(write_err)?;
            file.write_all(bytes).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(write_err(source));
        }
        Ok(())
    }
}

/// Write `update` into `target`, keeping existing keys where they are.
///
/// Keys missing from `update` are dropped and new ones are appended. Arrays
/// of equal length are merged element by element; anything else is replaced.
fn overlay(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(existing), Value::Object(update)) => {
            existing.retain(|key, _| update.contains_key(key));
            for (key, value) in update {
                match existing.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(existing), Value::Array(update)) if existing.len() == update.len() => {
            for (slot, value) in existing.iter_mut().zip(update) {
                overlay(slot, value);
            }
        }
        (target, update) => *target = update,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
