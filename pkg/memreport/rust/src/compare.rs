// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Overlay of the same charts across several finished runs.
//!
//! Each run's series are copied next to each other as `<metric>_<i>` and
//! every chart is redrawn from the combined selection, with the run alias
//! appended to the column labels.

use crate::column::Selection;
use crate::config::{ChartSpec, ReportConfig};
use crate::layout::{DATA_DIR, RunLayout};
use crate::plot::{Plotter, render_chart};
use crate::report::{collect_charts, write_report};
use crate::series::DataDir;
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A previously generated run taking part in a comparison.
#[derive(Debug, Clone)]
pub struct RunSource {
    pub data: DataDir,
    pub alias: String,
}

impl RunSource {
    /// `run_dir` is a report directory (the one holding `data/`). Without an
    /// explicit alias the run is labelled with the directory name.
    pub fn new(run_dir: &Path, alias: Option<String>) -> Self {
        let alias = alias.unwrap_or_else(|| {
            run_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| run_dir.display().to_string())
        });
        Self {
            data: DataDir::new(run_dir.join(DATA_DIR)),
            alias,
        }
    }
}

/// Copies the series `spec` needs from every run into `target` and returns
/// the chart redefined over the copies.
///
/// Series missing from a run are skipped with a warning; rendering the
/// returned chart then reports it as absent.
pub fn compare_chart(spec: &ChartSpec, runs: &[RunSource], target: &DataDir) -> Result<ChartSpec> {
    let mut selection = Selection::new();

    for (index, run) in runs.iter().enumerate() {
        for (metric, columns) in spec.metrics.iter() {
            let copy = format!("{metric}_{index}");
            let from = run.data.path(metric);
            let to = target.path(&copy);
            if from.is_file() {
                fs::copy(&from, &to).with_context(|| {
                    format!("failed to copy {} to {}", from.display(), to.display())
                })?;
                debug!("copied {} to {}", from.display(), to.display());
            } else {
                warn!("run '{}' has no data file {}", run.alias, from.display());
            }
            selection.insert(
                copy,
                columns
                    .iter()
                    .map(|column| column.with_suffix(&run.alias))
                    .collect(),
            );
        }
    }

    Ok(ChartSpec {
        title: spec.title.clone(),
        xlabel: spec.xlabel.clone(),
        ylabel: spec.ylabel.clone(),
        metrics: selection,
    })
}

/// Renders every configured chart across `runs` into `layout` and writes the
/// comparison page. Returns the report path.
pub fn compare_runs(
    config: &ReportConfig,
    runs: &[RunSource],
    layout: &RunLayout,
    plotter: &dyn Plotter,
) -> Result<PathBuf> {
    if runs.is_empty() {
        bail!("no runs to compare");
    }
    info!(
        "comparing {} runs: {}",
        runs.len(),
        runs.iter()
            .map(|run| run.alias.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let data = layout.data();
    let charts_dir = layout.charts_dir();
    let rendered = collect_charts(&config.categories, |spec| {
        let combined = compare_chart(spec, runs, &data)?;
        render_chart(&combined, &data, &charts_dir, plotter)
    })?;
    write_report(layout, config, &rendered)
}
