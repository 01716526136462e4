//! The `update` and `view` pipelines and their terminal output.
//!
//! Each step is wrapped in `anyhow` context naming the step, so a failure
//! reads as "<step>: <cause>" in the final error chain.

use crate::associations::{AssociationUpdater, ResolvedAssociation};
use crate::reconciler::{DistributionReconciler, UpdateResult};
use crate::versions::VersionResolver;
use crate::view::{RemoteView, ViewCommand};
use anyhow::{Context, Result};
use edgepin_config::{FunctionAssociation, Stage, StageConfigStore, to_indented_json};
use edgepin_provider::{DistributionApi, FunctionVersionsApi};
use std::io::{IsTerminal, Write};

/// ANSI styling for headings; disabled for pipes and when `NO_COLOR` is set.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn plain() -> Self {
        Self { enabled: false }
    }

    /// Colour when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        Self {
            enabled: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn paint(&self, codes: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}\x1b[0m", codes, text)
        } else {
            text.to_string()
        }
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint("\x1b[32m", text)
    }

    pub fn banner(&self, text: &str) -> String {
        self.paint("\x1b[34m\x1b[1m", text)
    }
}

/// Everything the update pipeline did, for reporting and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    pub stage: Stage,
    pub distribution_id: String,
    pub resolved: Vec<ResolvedAssociation>,
    pub result: UpdateResult,
}

/// Resolve latest function versions, save the stage, then push it to the distribution.
pub fn run_update(
    stage: Stage,
    store: &StageConfigStore,
    versions: &dyn FunctionVersionsApi,
    distributions: &dyn DistributionApi,
    style: Style,
    out: &mut dyn Write,
) -> Result<UpdateReport> {
    writeln!(out, "{}", style.banner(&format!("Stage: {}", stage)))?;

    let mut stage_config = store
        .load(stage)
        .map_err(crate::SyncError::from)
        .with_context(|| format!("Failed to load stage '{}' from {:?}", stage, store.path()))?;

    print_associations(stage_config.cache_behavior.associations(), style, out)?;

    let updater = AssociationUpdater::new(VersionResolver::new(versions));
    let resolution = updater
        .resolve_latest(&stage_config.cache_behavior)
        .with_context(|| format!("Failed to resolve latest function versions for stage '{}'", stage))?;
    stage_config.cache_behavior = resolution.cache_behavior;

    store
        .save(stage, &stage_config)
        .map_err(crate::SyncError::from)
        .with_context(|| format!("Failed to save stage '{}' to {:?}", stage, store.path()))?;

    writeln!(out, "{}", style.heading("Updated Lambda ARN to latest"))?;
    for entry in &resolution.resolved {
        let marker = if entry.changed() { "" } else { " (unchanged)" };
        writeln!(out, "  {}: {}{}", entry.trigger, entry.resolved, marker)?;
    }

    let reconciler = DistributionReconciler::new(distributions);
    let result = reconciler
        .apply(&stage_config.distribution_id, &stage_config.cache_behavior)
        .with_context(|| {
            format!(
                "Failed to update distribution {} for stage '{}'",
                stage_config.distribution_id, stage
            )
        })?;

    writeln!(out, "{}", style.heading("Updated CloudFront distribution"))?;
    writeln!(out, "  status: {}", result.status_code)?;
    if let Some(status) = &result.deployment_status {
        writeln!(out, "  deployment: {}", status)?;
    }

    Ok(UpdateReport {
        stage,
        distribution_id: stage_config.distribution_id,
        resolved: resolution.resolved,
        result,
    })
}

/// Fetch and print the live distribution config for a stage.
pub fn run_view(
    stage: Stage,
    store: &StageConfigStore,
    distributions: &dyn DistributionApi,
    style: Style,
    out: &mut dyn Write,
) -> Result<RemoteView> {
    writeln!(out, "{}", style.banner(&format!("Stage: {}", stage)))?;

    let reconciler = DistributionReconciler::new(distributions);
    let view = ViewCommand::new(store, &reconciler)
        .show(stage)
        .with_context(|| format!("Failed to fetch distribution config for stage '{}'", stage))?;

    writeln!(out, "{}", style.heading("DistributionConfig"))?;
    writeln!(out, "{}", view.rendered)?;
    Ok(view)
}

fn print_associations(
    associations: &[FunctionAssociation],
    style: Style,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "{}", style.heading("LambdaFunctionAssociations"))?;
    let rendered = to_indented_json(associations)?;
    out.write_all(&rendered)?;
    writeln!(out)?;
    Ok(())
}
