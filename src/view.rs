//! Read-only display of a stage's live distribution config.

use crate::error::SyncError;
use crate::reconciler::DistributionReconciler;
use edgepin_config::{Stage, StageConfigStore, to_indented_json};
use edgepin_provider::shapes;

/// The remote config for a stage, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteView {
    pub stage: Stage,
    pub distribution_id: String,
    pub etag: String,
    /// `DistributionConfig` as four-space-indented JSON in API member order
    pub rendered: String,
}

pub struct ViewCommand<'a> {
    store: &'a StageConfigStore,
    reconciler: &'a DistributionReconciler<'a>,
}

impl<'a> ViewCommand<'a> {
    pub fn new(store: &'a StageConfigStore, reconciler: &'a DistributionReconciler<'a>) -> Self {
        Self { store, reconciler }
    }

    /// Load the stage, fetch its distribution and render the whole config.
    pub fn show(&self, stage: Stage) -> Result<RemoteView, SyncError> {
        let stage_config = self.store.load(stage)?;
        let snapshot = self.reconciler.fetch(&stage_config.distribution_id)?;

        let bytes = to_indented_json(&shapes::to_json(&snapshot.config)).map_err(|e| {
            SyncError::InvalidConfig(format!("distribution config cannot be rendered: {}", e))
        })?;

        Ok(RemoteView {
            stage,
            distribution_id: stage_config.distribution_id,
            etag: snapshot.etag,
            rendered: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}
