// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Validate sweep plan loading and authoring checks.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use bcp_sweep::ir::{load_plan, parse_plan};
use bcp_sweep::{default_plan_path, generate, GenerateOptions, PlanError, SweepPlan};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn base_plan(run: &str, split: &str, instances: &str) -> String {
    format!(
        r#"
# Author: Lukas Bower
# Purpose: Sweep validation test plan.
[run]
{run}

[grids.grid]
agents = [10, 15, 20]
time_steps = [1, 2, 3]

[grids.split]
{split}

{instances}
"#
    )
}

const RUN: &str = r#"executable = "./bcp-mapf"
instance_dir = "./instances/movingai/"
log_dir = "./log/"
algorithm = "CCG"
timeout_s = 600"#;

const SPLIT: &str = r#"agents = [10, 20, 30, 40, 50]
time_step = 3
time_steps = [1, 2, 4, 5]
agent_count = 30"#;

const INSTANCES: &str = r#"[[instances]]
class = "random"
map = "random-64-64-20"
sweep = "split"
scenarios = [1, 13]"#;

fn validation_error(plan: &str) -> PlanError {
    parse_plan(plan)
        .expect("plan parses")
        .validate()
        .expect_err("plan should be rejected")
}

#[test]
fn shipped_plan_matches_builtin_tables() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(default_plan_path());
    let plan = load_plan(&path).expect("load shipped plan");
    assert_eq!(plan, SweepPlan::builtin());
}

#[test]
fn minimal_plan_validates() {
    let plan = parse_plan(&base_plan(RUN, SPLIT, INSTANCES)).expect("parse");
    plan.validate().expect("valid plan");
    assert_eq!(plan.total_runs(), 18);
}

#[test]
fn rejects_unsafe_run_fields() {
    let run = RUN.replace("./log/", "./my logs/");
    assert_eq!(
        validation_error(&base_plan(&run, SPLIT, INSTANCES)),
        PlanError::UnsafeField {
            field: "log_dir",
            value: "./my logs/".to_owned()
        }
    );
    let run = RUN.replace("\"CCG\"", "\"\"");
    assert_eq!(
        validation_error(&base_plan(&run, SPLIT, INSTANCES)),
        PlanError::EmptyField { field: "algorithm" }
    );
    let run = RUN.replace("./bcp-mapf", "./bcp-mapf;reboot");
    assert!(matches!(
        validation_error(&base_plan(&run, SPLIT, INSTANCES)),
        PlanError::UnsafeField { field: "executable", .. }
    ));
}

#[test]
fn rejects_zero_timeout() {
    let run = RUN.replace("timeout_s = 600", "timeout_s = 0");
    assert_eq!(
        validation_error(&base_plan(&run, SPLIT, INSTANCES)),
        PlanError::ZeroTimeout
    );
}

#[test]
fn rejects_missing_instances() {
    let mut plan = parse_plan(&base_plan(RUN, SPLIT, INSTANCES)).expect("parse");
    plan.instances.clear();
    assert_eq!(plan.validate(), Err(PlanError::NoInstances));
}

#[test]
fn rejects_duplicate_classes() {
    let instances = format!("{INSTANCES}\n\n{INSTANCES}");
    assert_eq!(
        validation_error(&base_plan(RUN, SPLIT, &instances)),
        PlanError::DuplicateClass("random".to_owned())
    );
}

#[test]
fn rejects_bad_scenario_lists() {
    let instances = INSTANCES.replace("[1, 13]", "[]");
    assert_eq!(
        validation_error(&base_plan(RUN, SPLIT, &instances)),
        PlanError::NoScenarios("random".to_owned())
    );
    let instances = INSTANCES.replace("[1, 13]", "[1, 13, 1]");
    assert_eq!(
        validation_error(&base_plan(RUN, SPLIT, &instances)),
        PlanError::DuplicateScenario {
            class: "random".to_owned(),
            id: 1
        }
    );
}

#[test]
fn rejects_unusable_map_and_class() {
    let instances = INSTANCES.replace("random-64-64-20", "random map");
    assert!(matches!(
        validation_error(&base_plan(RUN, SPLIT, &instances)),
        PlanError::UnsafeMap { .. }
    ));
    let instances = INSTANCES.replace("class = \"random\"", "class = \" \"");
    assert_eq!(
        validation_error(&base_plan(RUN, SPLIT, &instances)),
        PlanError::EmptyClass
    );
}

#[test]
fn rejects_bad_sweep_values() {
    let split = SPLIT.replace("agents = [10, 20, 30, 40, 50]", "agents = []");
    assert_eq!(
        validation_error(&base_plan(RUN, &split, INSTANCES)),
        PlanError::EmptyList {
            list: "grids.split.agents"
        }
    );
    let split = SPLIT.replace("[1, 2, 4, 5]", "[1, 0]");
    assert_eq!(
        validation_error(&base_plan(RUN, &split, INSTANCES)),
        PlanError::ZeroValue {
            list: "grids.split.time_steps"
        }
    );
    let split = SPLIT.replace("[10, 20, 30, 40, 50]", "[10, 20, 10]");
    assert_eq!(
        validation_error(&base_plan(RUN, &split, INSTANCES)),
        PlanError::DuplicateValue {
            list: "grids.split.agents",
            value: 10
        }
    );
    let split = SPLIT.replace("agent_count = 30", "agent_count = 0");
    assert_eq!(
        validation_error(&base_plan(RUN, &split, INSTANCES)),
        PlanError::ZeroValue {
            list: "grids.split.agent_count"
        }
    );
}

#[test]
fn rejects_time_step_sweep_overlapping_agent_sweep() {
    let split = SPLIT.replace("[1, 2, 4, 5]", "[1, 2, 3, 4, 5]");
    assert_eq!(
        validation_error(&base_plan(RUN, &split, INSTANCES)),
        PlanError::SplitOverlap(3)
    );
}

#[test]
fn rejects_unknown_fields() {
    let run = format!("{RUN}\nretries = 2");
    assert!(parse_plan(&base_plan(&run, SPLIT, INSTANCES)).is_err());
}

#[test]
fn generate_reports_plan_path_on_failure() {
    let temp_dir = TempDir::new().expect("tempdir");
    let plan_path = temp_dir.path().join("plan.toml");
    fs::write(
        &plan_path,
        base_plan(&RUN.replace("timeout_s = 600", "timeout_s = 0"), SPLIT, INSTANCES),
    )
    .expect("write plan");
    let options = GenerateOptions {
        plan_path: Some(plan_path.clone()),
        ..GenerateOptions::default()
    };
    let mut stdout = Vec::new();
    let err = generate(&options, &mut stdout).expect_err("invalid plan");
    let message = format!("{err:#}");
    assert!(message.contains(&plan_path.display().to_string()), "{message}");
    assert!(message.contains("run.timeout_s must be >= 1"), "{message}");
    assert_eq!(err.downcast_ref::<PlanError>(), Some(&PlanError::ZeroTimeout));
    assert!(stdout.is_empty());
}

#[test]
fn generate_rejects_missing_plan_file() {
    let temp_dir = TempDir::new().expect("tempdir");
    let options = GenerateOptions {
        plan_path: Some(temp_dir.path().join("absent.toml")),
        ..GenerateOptions::default()
    };
    let err = generate(&options, &mut Vec::new()).expect_err("missing plan");
    assert!(format!("{err:#}").contains("failed to read plan"));
}
