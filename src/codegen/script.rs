// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Enumerate bcp-mapf invocations and render them as a shell script.
// Author: Lukas Bower

use crate::ir::{InstanceSpec, RunSection, SweepKind, SweepPlan};
use std::collections::BTreeMap;
use std::fmt;

/// How the per-run log file is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogNaming {
    /// `<map>-random-<id>-<alg>`; shared across agent counts and time steps.
    Plain,
    /// `<map>-random-<id>-<agents>agents-<ts>ts-<alg>`.
    Tagged,
}

/// One solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub run: &'a RunSection,
    pub class: &'a str,
    pub map: &'a str,
    pub scenario: u32,
    pub agents: u32,
    pub time_step: u32,
    pub naming: LogNaming,
}

impl Invocation<'_> {
    pub fn scenario_path(&self) -> String {
        format!(
            "{}{}-random-{}.scen",
            self.run.instance_dir, self.map, self.scenario
        )
    }

    pub fn log_name(&self) -> String {
        match self.naming {
            LogNaming::Plain => format!(
                "{}-random-{}-{}",
                self.map, self.scenario, self.run.algorithm
            ),
            LogNaming::Tagged => format!(
                "{}-random-{}-{}agents-{}ts-{}",
                self.map, self.scenario, self.agents, self.time_step, self.run.algorithm
            ),
        }
    }

    pub fn log_path(&self) -> String {
        format!("{}{}.log", self.run.log_dir, self.log_name())
    }
}

impl fmt::Display for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -a {} -s {} -t {} {} >> {}",
            self.run.executable,
            self.agents,
            self.time_step,
            self.run.timeout_s,
            self.scenario_path(),
            self.log_path()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine<'a> {
    MakeLogDir(&'a str),
    Run(Invocation<'a>),
}

impl fmt::Display for ScriptLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MakeLogDir(dir) => write!(f, "mkdir -p {dir}"),
            Self::Run(invocation) => fmt::Display::fmt(invocation, f),
        }
    }
}

/// A log file appended to by more than one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLog {
    pub path: String,
    pub writers: usize,
}

pub fn enumerate(plan: &SweepPlan) -> Vec<ScriptLine<'_>> {
    let mut lines = Vec::with_capacity(plan.total_runs() + 1);
    lines.push(ScriptLine::MakeLogDir(plan.run.log_dir.as_str()));
    for spec in &plan.instances {
        match spec.sweep {
            SweepKind::Grid => push_grid(plan, spec, &mut lines),
            SweepKind::Split => push_split(plan, spec, &mut lines),
        }
    }
    lines
}

fn push_grid<'a>(plan: &'a SweepPlan, spec: &'a InstanceSpec, lines: &mut Vec<ScriptLine<'a>>) {
    let grid = &plan.grids.grid;
    for &agents in &grid.agents {
        for &time_step in &grid.time_steps {
            push_scenarios(plan, spec, agents, time_step, LogNaming::Plain, lines);
        }
    }
}

fn push_split<'a>(plan: &'a SweepPlan, spec: &'a InstanceSpec, lines: &mut Vec<ScriptLine<'a>>) {
    let split = &plan.grids.split;
    for &agents in &split.agents {
        push_scenarios(plan, spec, agents, split.time_step, LogNaming::Plain, lines);
    }
    for &time_step in &split.time_steps {
        push_scenarios(
            plan,
            spec,
            split.agent_count,
            time_step,
            LogNaming::Tagged,
            lines,
        );
    }
}

fn push_scenarios<'a>(
    plan: &'a SweepPlan,
    spec: &'a InstanceSpec,
    agents: u32,
    time_step: u32,
    naming: LogNaming,
    lines: &mut Vec<ScriptLine<'a>>,
) {
    lines.extend(spec.scenarios.iter().map(|&scenario| {
        ScriptLine::Run(Invocation {
            run: &plan.run,
            class: &spec.class,
            map: &spec.map,
            scenario,
            agents,
            time_step,
            naming,
        })
    }));
}

/// Newline-terminated script text, one line per enumerated entry.
pub fn render_script(plan: &SweepPlan) -> String {
    let mut contents = String::new();
    for line in enumerate(plan) {
        contents.push_str(&line.to_string());
        contents.push('\n');
    }
    contents
}

/// Log paths that several invocations append to, in path order.
pub fn shared_log_targets(plan: &SweepPlan) -> Vec<SharedLog> {
    let mut writers: BTreeMap<String, usize> = BTreeMap::new();
    for line in enumerate(plan) {
        if let ScriptLine::Run(invocation) = line {
            *writers.entry(invocation.log_path()).or_default() += 1;
        }
    }
    writers
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(path, writers)| SharedLog { path, writers })
        .collect()
}
