// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Emit a Markdown summary of the sweep plan.
// Author: Lukas Bower

use crate::ir::{SweepKind, SweepPlan};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn render_summary(plan: &SweepPlan, script_hash: &str) -> Result<String> {
    let mut contents = String::new();
    writeln!(contents, "<!-- Author: Lukas Bower -->")?;
    writeln!(
        contents,
        "<!-- Purpose: Generated bcp-mapf sweep summary. -->"
    )?;
    writeln!(contents)?;
    writeln!(contents, "### bcp-mapf sweep (generated)")?;
    writeln!(contents, "- `run.executable`: `{}`", plan.run.executable)?;
    writeln!(contents, "- `run.instance_dir`: `{}`", plan.run.instance_dir)?;
    writeln!(contents, "- `run.log_dir`: `{}`", plan.run.log_dir)?;
    writeln!(contents, "- `run.algorithm`: `{}`", plan.run.algorithm)?;
    writeln!(contents, "- `run.timeout_s`: `{}`", plan.run.timeout_s)?;
    writeln!(contents)?;

    let grid = &plan.grids.grid;
    let split = &plan.grids.split;
    writeln!(contents, "| Class | Map | Sweep | Agents | Time steps | Scenarios | Runs |")?;
    writeln!(contents, "| --- | --- | --- | --- | --- | --- | --- |")?;
    for spec in &plan.instances {
        let (agents, time_steps) = match spec.sweep {
            SweepKind::Grid => (join(&grid.agents), join(&grid.time_steps)),
            SweepKind::Split => (
                format!(
                    "{} (ts {}); {}",
                    join(&split.agents),
                    split.time_step,
                    split.agent_count
                ),
                format!("{}; {}", split.time_step, join(&split.time_steps)),
            ),
        };
        writeln!(
            contents,
            "| `{}` | `{}` | {} | {} | {} | {} | {} |",
            spec.class,
            spec.map,
            spec.sweep.as_str(),
            agents,
            time_steps,
            join(&spec.scenarios),
            plan.runs_for(spec)
        )?;
    }
    writeln!(contents)?;
    writeln!(
        contents,
        "_{} runs; script sha256: `{}`._",
        plan.total_runs(),
        script_hash
    )?;
    Ok(contents)
}

pub fn emit_summary(plan: &SweepPlan, script_hash: &str, path: &Path) -> Result<()> {
    let contents = render_summary(plan, script_hash)?;
    fs::write(path, contents)
        .with_context(|| format!("failed to write sweep summary {}", path.display()))?;
    Ok(())
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
