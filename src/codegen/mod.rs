// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Emit deterministic artefacts from the sweep plan.
// Author: Lukas Bower

pub mod docs;
pub mod script;

use crate::ir::SweepPlan;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use script::{
    enumerate, render_script, shared_log_targets, Invocation, LogNaming, ScriptLine, SharedLog,
};

/// Where each requested artefact ended up.
#[derive(Debug, Default)]
pub struct GeneratedArtifacts {
    pub script: Option<PathBuf>,
    pub script_hash: Option<PathBuf>,
    pub resolved: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub runs: usize,
    pub digest: String,
}

impl GeneratedArtifacts {
    pub fn summary(&self) -> String {
        format!(
            "runs={}, script={}, resolved={}, summary={}",
            self.runs,
            display_or_stdout(self.script.as_deref()),
            display_or_none(self.resolved.as_deref()),
            display_or_none(self.summary.as_deref())
        )
    }
}

fn display_or_stdout(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdout>".to_owned())
}

fn display_or_none(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_owned())
}

pub fn emit_all(
    plan: &SweepPlan,
    options: &crate::GenerateOptions,
    stdout: &mut dyn Write,
) -> Result<GeneratedArtifacts> {
    let script = render_script(plan);
    let digest = hash_bytes(script.as_bytes());
    let mut artefacts = GeneratedArtifacts {
        runs: plan.total_runs(),
        digest: digest.clone(),
        ..GeneratedArtifacts::default()
    };

    match &options.script_out {
        Some(path) => {
            ensure_parent(path)?;
            fs::write(path, &script)
                .with_context(|| format!("failed to write script {}", path.display()))?;
            let hash_path = emit_script_hash(&digest, path)?;
            artefacts.script = Some(path.clone());
            artefacts.script_hash = Some(hash_path);
        }
        None => {
            stdout
                .write_all(script.as_bytes())
                .context("failed to write script to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }
    }

    if let Some(path) = &options.resolved_out {
        ensure_parent(path)?;
        let resolved = crate::ir::serialize_plan(plan)?;
        fs::write(path, resolved)
            .with_context(|| format!("failed to write resolved plan {}", path.display()))?;
        artefacts.resolved = Some(path.clone());
    }

    if let Some(path) = &options.summary_out {
        ensure_parent(path)?;
        docs::emit_summary(plan, &digest, path)?;
        artefacts.summary = Some(path.clone());
    }

    Ok(artefacts)
}

fn emit_script_hash(digest: &str, script_path: &Path) -> Result<PathBuf> {
    let hash_path = script_path.with_extension(
        script_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!("{ext}.sha256"))
            .unwrap_or_else(|| "sha256".to_owned()),
    );
    let hash_contents = format!(
        "{}  {}\n",
        digest,
        script_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("bcp_sweep.sh")
    );
    fs::write(&hash_path, hash_contents)
        .with_context(|| format!("failed to write script hash {}", hash_path.display()))?;
    Ok(hash_path)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    hex::encode(digest)
}
