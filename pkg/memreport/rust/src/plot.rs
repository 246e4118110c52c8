// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Chart rendering through an external plotting program.

use crate::config::ChartSpec;
use crate::errors::Error;
use crate::merge;
use crate::series::DataDir;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

const CHART_EXTENSION: &str = "png";

/// A chart that was rendered successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    pub title: String,
    /// Series the image was drawn from (merged name for multi-metric charts).
    pub metric: String,
    pub data_file: PathBuf,
    pub chart_file: PathBuf,
}

/// Everything a plotter needs to draw one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest<'a> {
    pub title: &'a str,
    pub xlabel: &'a str,
    pub ylabel: &'a str,
    pub output: &'a Path,
    pub data: &'a Path,
    /// 1-based columns of `data` to draw against column 1.
    pub columns: &'a [usize],
}

pub trait Plotter {
    fn render(&self, request: &PlotRequest) -> Result<()>;
}

/// Runs `program title xlabel ylabel output data "c1 c2 ..."`.
#[derive(Debug, Clone)]
pub struct CommandPlotter {
    program: PathBuf,
}

impl CommandPlotter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Plotter for CommandPlotter {
    fn render(&self, request: &PlotRequest) -> Result<()> {
        let columns = request
            .columns
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        debug!(
            "running {} for {} (columns {columns})",
            self.program.display(),
            request.output.display()
        );

        let output = Command::new(&self.program)
            .arg(request.title)
            .arg(request.xlabel)
            .arg(request.ylabel)
            .arg(request.output)
            .arg(request.data)
            .arg(&columns)
            .output()
            .with_context(|| format!("failed to run plotter {}", self.program.display()))?;

        if !output.status.success() {
            warn!(
                "plotter exited with {} for '{}': {}",
                output.status,
                request.title,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// File-name slug of a chart title.
pub fn slugify(title: &str) -> String {
    #[allow(clippy::unwrap_used)] // constant patterns, cannot fail
    static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_-]+").unwrap());
    #[allow(clippy::unwrap_used)] // constant patterns, cannot fail
    static REPEATED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__+").unwrap());

    let lowered = title.to_lowercase();
    let replaced = UNSAFE_CHARS.replace_all(&lowered, "_");
    REPEATED.replace_all(&replaced, "_").into_owned()
}

/// Renders `spec` into `charts_dir`.
///
/// Several metrics are merged into one series first. Returns `Ok(None)` when
/// a data file is missing or the plotter produced no image.
pub fn render_chart(
    spec: &ChartSpec,
    data: &DataDir,
    charts_dir: &Path,
    plotter: &dyn Plotter,
) -> Result<Option<Chart>> {
    let selection = &spec.metrics;
    if selection.is_empty() {
        return Err(Error::EmptySelection {
            title: spec.title.clone(),
        }
        .into());
    }

    let (metric, data_file, columns) = if selection.len() > 1 {
        let metric = selection.joined_name();
        let Some(data_file) = merge::merge(data, selection, &metric, None)? else {
            return Ok(None);
        };
        let columns: Vec<usize> = selection
            .layout()
            .into_iter()
            .flatten()
            .map(|slot| slot + 1)
            .collect();
        (metric, data_file, columns)
    } else {
        let Some((metric, refs)) = selection.iter().next() else {
            return Ok(None);
        };
        let data_file = data.path(metric);
        if !data_file.is_file() {
            warn!(
                "skipping chart '{}': data file {} is not found",
                spec.title,
                data_file.display()
            );
            return Ok(None);
        }
        let columns = refs.iter().map(|column| column.index() + 1).collect();
        (metric.to_string(), data_file, columns)
    };

    let chart_file = charts_dir.join(format!("{}.{CHART_EXTENSION}", slugify(&spec.title)));
    info!("rendering chart '{}' to {}", spec.title, chart_file.display());
    // Only an image written by this call counts as the chart.
    if chart_file.exists() {
        fs::remove_file(&chart_file)
            .with_context(|| format!("failed to remove stale chart {}", chart_file.display()))?;
    }
    plotter.render(&PlotRequest {
        title: &spec.title,
        xlabel: &spec.xlabel,
        ylabel: &spec.ylabel,
        output: &chart_file,
        data: &data_file,
        columns: &columns,
    })?;

    if !chart_file.is_file() {
        warn!(
            "chart '{}' was not created at {}",
            spec.title,
            chart_file.display()
        );
        return Ok(None);
    }

    Ok(Some(Chart {
        title: spec.title.clone(),
        metric,
        data_file,
        chart_file,
    }))
}
