// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::Result;
use clap::Parser;
use log::info;
use memreport::CommandPlotter;
use memreport::config::{get_log_level, load_config};
use memreport::layout::{RunLayout, run_id};
use memreport::report::{open_in_browser, run_report};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memreport")]
#[command(about = "Generates an HTML report from allocator sample measurements", long_about = None)]
struct Args {
    /// Sample name, the measurements are read from <path>/<sample>
    #[arg(long)]
    sample: String,

    /// The path to the measurements
    #[arg(long)]
    path: PathBuf,

    /// The path to the reports, the report is written to <output>/<sample>/<run id>
    #[arg(long)]
    output: PathBuf,

    /// YAML report definitions (built-in definitions when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Plotting program, overrides the configured one
    #[arg(long)]
    plotter: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Open the report in a browser when done
    #[arg(long)]
    open: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    simple_logger::init_with_level(get_log_level(args.log_level.as_deref(), &config))?;

    let input_dir = args.path.join(&args.sample);
    let layout = RunLayout::create(args.output.join(&args.sample).join(run_id()?))?;
    info!(
        "generating report for {} into {}",
        input_dir.display(),
        layout.root().display()
    );

    let plotter = CommandPlotter::new(args.plotter.unwrap_or_else(|| config.plotter.clone()));
    let report = run_report(&config, &input_dir, &layout, &plotter)?;
    info!("generated {}", report.display());

    if args.open {
        open_in_browser(&report);
    }
    Ok(())
}
