// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: CLI entry point for the bcp-mapf sweep generator.
// Author: Lukas Bower

use anyhow::Result;
use bcp_sweep::{generate, resolve_plan, GenerateOptions};
use clap::Parser;
use env_logger::Env;
use log::LevelFilter;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Sweep plan TOML; defaults to the built-in benchmark tables.
    #[arg(long)]
    plan: Option<PathBuf>,
    /// Write the script here instead of standard output.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output path for the resolved plan JSON.
    #[arg(long)]
    resolved: Option<PathBuf>,
    /// Output path for the Markdown sweep summary.
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Validate the plan and report run counts without emitting a script.
    #[arg(
        long,
        default_value_t = false,
        conflicts_with_all = ["out", "resolved", "summary"]
    )]
    check: bool,
    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(default_level.as_str()));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn run(args: Args) -> Result<()> {
    if args.check {
        let plan = resolve_plan(args.plan.as_deref())?;
        let shared = bcp_sweep::report_shared_logs(&plan);
        for spec in &plan.instances {
            eprintln!("{} ({}): {} runs", spec.class, spec.map, plan.runs_for(spec));
        }
        eprintln!(
            "bcp-sweep: plan ok, {} runs, {} shared log files",
            plan.total_runs(),
            shared
        );
        return Ok(());
    }

    let options = GenerateOptions {
        plan_path: args.plan,
        script_out: args.out,
        resolved_out: args.resolved,
        summary_out: args.summary,
    };
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let output = generate(&options, &mut handle)?;
    if output.script.is_some() {
        eprintln!("bcp-sweep: wrote {}", output.summary());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
