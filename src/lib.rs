// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Expose bcp-mapf sweep generation helpers for tests and the CLI.
// Author: Lukas Bower

//! Generates shell scripts that sweep the `bcp-mapf` solver over benchmark
//! instances, agent counts and time steps.

pub mod codegen;
pub mod ir;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

pub use ir::{PlanError, SweepPlan};

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// TOML plan to load; the built-in tables are used when absent.
    pub plan_path: Option<PathBuf>,
    /// Script destination; standard output when absent.
    pub script_out: Option<PathBuf>,
    pub resolved_out: Option<PathBuf>,
    pub summary_out: Option<PathBuf>,
}

/// Load (or build) the plan and reject authoring defects.
pub fn resolve_plan(plan_path: Option<&Path>) -> Result<SweepPlan> {
    let plan = match plan_path {
        Some(path) => {
            debug!("loading sweep plan from {}", path.display());
            ir::load_plan(path)?
        }
        None => SweepPlan::builtin(),
    };
    plan.validate().with_context(|| match plan_path {
        Some(path) => format!("invalid sweep plan {}", path.display()),
        None => "invalid built-in sweep plan".to_owned(),
    })?;
    Ok(plan)
}

/// Report log files that several runs append to. The script is left as is.
pub fn report_shared_logs(plan: &SweepPlan) -> usize {
    let shared = codegen::shared_log_targets(plan);
    if !shared.is_empty() {
        warn!(
            "{} log files receive output from more than one run",
            shared.len()
        );
        for log in &shared {
            debug!("shared log {} ({} runs)", log.path, log.writers);
        }
    }
    shared.len()
}

pub fn generate(
    options: &GenerateOptions,
    stdout: &mut dyn Write,
) -> Result<codegen::GeneratedArtifacts> {
    let plan = resolve_plan(options.plan_path.as_deref())?;
    report_shared_logs(&plan);
    let artefacts = codegen::emit_all(&plan, options, stdout)?;
    info!(
        "generated {} runs across {} instance classes (sha256 {})",
        artefacts.runs,
        plan.instances.len(),
        artefacts.digest
    );
    Ok(artefacts)
}

pub fn default_plan_path() -> PathBuf {
    Path::new("configs").join("bcp_sweep.toml")
}
