// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Define, load and validate the bcp-mapf sweep plan IR.
// Author: Lukas Bower

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

const EXECUTABLE: &str = "./bcp-mapf";
const INSTANCE_DIR: &str = "./instances/movingai/";
const LOG_DIR: &str = "./log/";
const ALGORITHM: &str = "CCG";
const TIMEOUT_S: u32 = 600;

const GRID_AGENTS: [u32; 3] = [10, 15, 20];
const GRID_TIME_STEPS: [u32; 3] = [1, 2, 3];
const SPLIT_AGENTS: [u32; 5] = [10, 20, 30, 40, 50];
const SPLIT_TIME_STEP: u32 = 3;
const SPLIT_TIME_STEPS: [u32; 4] = [1, 2, 4, 5];
const SPLIT_AGENT_COUNT: u32 = 30;

/// Built-in instance table: class tag, map identifier, sweep kind, scenario ids.
const INSTANCES: [(&str, &str, SweepKind, [u32; 10]); 5] = [
    (
        "empty",
        "empty-8-8",
        SweepKind::Grid,
        [1, 12, 13, 14, 15, 19, 23, 24, 25, 6],
    ),
    (
        "random",
        "random-64-64-20",
        SweepKind::Split,
        [1, 13, 14, 15, 18, 19, 22, 23, 25, 7],
    ),
    (
        "rmfs_1",
        "warehouse-10-20-10-2-1",
        SweepKind::Split,
        [1, 10, 11, 14, 16, 17, 20, 21, 6, 7],
    ),
    (
        "rmfs_2",
        "warehouse-20-40-10-2-2",
        SweepKind::Split,
        [14, 15, 18, 19, 22, 23, 4, 5, 8, 9],
    ),
    (
        "rooms",
        "brc202d",
        SweepKind::Split,
        [14, 15, 18, 19, 22, 23, 4, 5, 8, 9],
    ),
];

/// Characters that would change the meaning of an unquoted shell word.
const SHELL_META: &[char] = &[
    '\'', '"', '`', '$', '&', '|', ';', '<', '>', '(', ')', '{', '}', '*', '?', '[', ']', '!',
    '#', '~', '\\',
];

/// Authoring defects detected while validating a sweep plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("run.{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("run.{field} `{value}` contains whitespace or shell metacharacters")]
    UnsafeField { field: &'static str, value: String },
    #[error("run.timeout_s must be >= 1")]
    ZeroTimeout,
    #[error("plan declares no instances")]
    NoInstances,
    #[error("duplicate instance class `{0}`")]
    DuplicateClass(String),
    #[error("instance class must not be empty")]
    EmptyClass,
    #[error("instance `{class}` has an unusable map name `{map}`")]
    UnsafeMap { class: String, map: String },
    #[error("instance `{0}` lists no scenarios")]
    NoScenarios(String),
    #[error("instance `{class}` repeats scenario {id}")]
    DuplicateScenario { class: String, id: u32 },
    #[error("{list} must not be empty")]
    EmptyList { list: &'static str },
    #[error("{list} contains zero")]
    ZeroValue { list: &'static str },
    #[error("{list} repeats value {value}")]
    DuplicateValue { list: &'static str, value: u32 },
    #[error("grids.split.time_steps repeats the agent sweep time step {0}")]
    SplitOverlap(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepPlan {
    pub run: RunSection,
    pub grids: Grids,
    pub instances: Vec<InstanceSpec>,
}

/// Fixed constants shared by every generated line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub executable: String,
    pub instance_dir: String,
    pub log_dir: String,
    pub algorithm: String,
    pub timeout_s: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Grids {
    pub grid: GridSweep,
    pub split: SplitSweep,
}

/// Full agent × time-step product with plain log names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSweep {
    pub agents: Vec<u32>,
    pub time_steps: Vec<u32>,
}

/// Agent sweep at `time_step`, followed by a time-step sweep at `agent_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitSweep {
    pub agents: Vec<u32>,
    pub time_step: u32,
    pub time_steps: Vec<u32>,
    pub agent_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceSpec {
    pub class: String,
    pub map: String,
    pub sweep: SweepKind,
    pub scenarios: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepKind {
    Grid,
    Split,
}

impl SweepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Split => "split",
        }
    }
}

impl SweepPlan {
    /// The benchmark tables shipped with the solver.
    pub fn builtin() -> Self {
        Self {
            run: RunSection {
                executable: EXECUTABLE.to_owned(),
                instance_dir: INSTANCE_DIR.to_owned(),
                log_dir: LOG_DIR.to_owned(),
                algorithm: ALGORITHM.to_owned(),
                timeout_s: TIMEOUT_S,
            },
            grids: Grids {
                grid: GridSweep {
                    agents: GRID_AGENTS.to_vec(),
                    time_steps: GRID_TIME_STEPS.to_vec(),
                },
                split: SplitSweep {
                    agents: SPLIT_AGENTS.to_vec(),
                    time_step: SPLIT_TIME_STEP,
                    time_steps: SPLIT_TIME_STEPS.to_vec(),
                    agent_count: SPLIT_AGENT_COUNT,
                },
            },
            instances: INSTANCES
                .iter()
                .map(|(class, map, sweep, scenarios)| InstanceSpec {
                    class: (*class).to_owned(),
                    map: (*map).to_owned(),
                    sweep: *sweep,
                    scenarios: scenarios.to_vec(),
                })
                .collect(),
        }
    }

    /// Number of solver invocations one instance expands to.
    pub fn runs_for(&self, spec: &InstanceSpec) -> usize {
        let per_scenario = match spec.sweep {
            SweepKind::Grid => self.grids.grid.agents.len() * self.grids.grid.time_steps.len(),
            SweepKind::Split => self.grids.split.agents.len() + self.grids.split.time_steps.len(),
        };
        per_scenario * spec.scenarios.len()
    }

    pub fn total_runs(&self) -> usize {
        self.instances.iter().map(|spec| self.runs_for(spec)).sum()
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        self.validate_run()?;
        self.validate_grids()?;
        self.validate_instances()?;
        Ok(())
    }

    fn validate_run(&self) -> Result<(), PlanError> {
        ensure_word("executable", &self.run.executable)?;
        ensure_word("instance_dir", &self.run.instance_dir)?;
        ensure_word("log_dir", &self.run.log_dir)?;
        ensure_word("algorithm", &self.run.algorithm)?;
        if self.run.timeout_s == 0 {
            return Err(PlanError::ZeroTimeout);
        }
        Ok(())
    }

    fn validate_grids(&self) -> Result<(), PlanError> {
        let grid = &self.grids.grid;
        ensure_values("grids.grid.agents", &grid.agents)?;
        ensure_values("grids.grid.time_steps", &grid.time_steps)?;

        let split = &self.grids.split;
        ensure_values("grids.split.agents", &split.agents)?;
        ensure_values("grids.split.time_steps", &split.time_steps)?;
        if split.time_step == 0 {
            return Err(PlanError::ZeroValue {
                list: "grids.split.time_step",
            });
        }
        if split.agent_count == 0 {
            return Err(PlanError::ZeroValue {
                list: "grids.split.agent_count",
            });
        }
        if split.time_steps.contains(&split.time_step) {
            return Err(PlanError::SplitOverlap(split.time_step));
        }
        Ok(())
    }

    fn validate_instances(&self) -> Result<(), PlanError> {
        if self.instances.is_empty() {
            return Err(PlanError::NoInstances);
        }
        let mut classes = BTreeSet::new();
        for spec in &self.instances {
            if spec.class.trim().is_empty() {
                return Err(PlanError::EmptyClass);
            }
            if !classes.insert(spec.class.as_str()) {
                return Err(PlanError::DuplicateClass(spec.class.clone()));
            }
            if !is_shell_word(&spec.map) {
                return Err(PlanError::UnsafeMap {
                    class: spec.class.clone(),
                    map: spec.map.clone(),
                });
            }
            if spec.scenarios.is_empty() {
                return Err(PlanError::NoScenarios(spec.class.clone()));
            }
            let mut seen = BTreeSet::new();
            for id in &spec.scenarios {
                if !seen.insert(*id) {
                    return Err(PlanError::DuplicateScenario {
                        class: spec.class.clone(),
                        id: *id,
                    });
                }
            }
        }
        Ok(())
    }
}

fn is_shell_word(value: &str) -> bool {
    !value.is_empty()
        && !value
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control() || SHELL_META.contains(&ch))
}

fn ensure_word(field: &'static str, value: &str) -> Result<(), PlanError> {
    if value.is_empty() {
        return Err(PlanError::EmptyField { field });
    }
    if !is_shell_word(value) {
        return Err(PlanError::UnsafeField {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

fn ensure_values(list: &'static str, values: &[u32]) -> Result<(), PlanError> {
    if values.is_empty() {
        return Err(PlanError::EmptyList { list });
    }
    let mut seen = BTreeSet::new();
    for value in values {
        if *value == 0 {
            return Err(PlanError::ZeroValue { list });
        }
        if !seen.insert(*value) {
            return Err(PlanError::DuplicateValue {
                list,
                value: *value,
            });
        }
    }
    Ok(())
}

pub fn load_plan(path: &Path) -> Result<SweepPlan> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    parse_plan(&contents).with_context(|| format!("invalid plan TOML in {}", path.display()))
}

pub fn parse_plan(contents: &str) -> Result<SweepPlan> {
    let plan: SweepPlan = toml::from_str(contents)?;
    Ok(plan)
}

pub fn serialize_plan(plan: &SweepPlan) -> Result<Vec<u8>> {
    let json = serde_json::to_vec_pretty(plan)?;
    Ok(json)
}
