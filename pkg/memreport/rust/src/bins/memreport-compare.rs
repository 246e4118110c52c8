// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use anyhow::Result;
use clap::Parser;
use log::info;
use memreport::CommandPlotter;
use memreport::compare::{RunSource, compare_runs};
use memreport::config::{get_log_level, load_config};
use memreport::layout::{RunLayout, run_id};
use memreport::report::open_in_browser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "memreport-compare")]
#[command(about = "Overlays the charts of several generated reports", long_about = None)]
struct Args {
    /// Comma separated report directories to compare
    #[arg(long, value_delimiter = ',', required = true)]
    reports: Vec<PathBuf>,

    /// The path to the comparison reports, written to <path>/<run id>
    #[arg(long)]
    path: PathBuf,

    /// Comma separated labels, one per report (defaults to the directory name)
    #[arg(long, value_delimiter = ',')]
    alias: Vec<String>,

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

    let runs: Vec<RunSource> = args
        .reports
        .iter()
        .enumerate()
        .map(|(index, dir)| RunSource::new(dir, args.alias.get(index).cloned()))
        .collect();

    let layout = RunLayout::create(args.path.join(run_id()?))?;
    let plotter = CommandPlotter::new(args.plotter.unwrap_or_else(|| config.plotter.clone()));
    let report = compare_runs(&config, &runs, &layout, &plotter)?;
    info!("generated {}", report.display());

    if args.open {
        open_in_browser(&report);
    }
    Ok(())
}
