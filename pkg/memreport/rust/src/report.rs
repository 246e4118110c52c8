// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Report assembly: renders every configured chart and writes `report.html`.

use crate::config::{Category, ChartSpec, ReportConfig};
use crate::derived::build_derived;
use crate::layout::RunLayout;
use crate::normalize::normalize_dir;
use crate::plot::{Chart, Plotter, render_chart};
use anyhow::{Context, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use log::{info, warn};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use time::OffsetDateTime;
use time::macros::format_description;

const STYLESHEET: &str = include_str!("report.css");

/// Charts of one category in definition order. Absent entries keep their
/// position so the page layout does not depend on which charts rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCategory {
    pub name: String,
    pub charts: Vec<Option<Chart>>,
}

impl RenderedCategory {
    pub fn present(&self) -> usize {
        self.charts.iter().flatten().count()
    }
}

/// Calls `render` for every chart of every category.
pub fn collect_charts<F>(categories: &[Category], mut render: F) -> Result<Vec<RenderedCategory>>
where
    F: FnMut(&ChartSpec) -> Result<Option<Chart>>,
{
    let mut owners = HashMap::new();
    let mut rendered = Vec::with_capacity(categories.len());
    for category in categories {
        let mut charts = Vec::with_capacity(category.charts.len());
        for spec in &category.charts {
            let chart = render(spec)?;
            if let Some(chart) = &chart
                && let Some(previous) = claim_chart_file(&mut owners, chart)
            {
                warn!(
                    "chart '{}' overwrote the image of chart '{previous}' at {}",
                    chart.title,
                    chart.chart_file.display()
                );
            }
            charts.push(chart);
        }
        rendered.push(RenderedCategory {
            name: category.name.clone(),
            charts,
        });
    }
    Ok(rendered)
}

/// Records `chart` as the owner of its image file. Returns the title of a
/// different chart that already wrote the same file.
fn claim_chart_file(owners: &mut HashMap<PathBuf, String>, chart: &Chart) -> Option<String> {
    match owners.insert(chart.chart_file.clone(), chart.title.clone()) {
        Some(previous) if previous != chart.title => Some(previous),
        _ => None,
    }
}

/// Renders the configured charts from the series in `layout`.
pub fn generate_charts(
    config: &ReportConfig,
    layout: &RunLayout,
    plotter: &dyn Plotter,
) -> Result<Vec<RenderedCategory>> {
    let data = layout.data();
    let charts_dir = layout.charts_dir();
    collect_charts(&config.categories, |spec| {
        render_chart(spec, &data, &charts_dir, plotter)
    })
}

/// Path of `path` relative to the report directory, with `/` separators.
fn link(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        return path.display().to_string();
    };
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_category(out: &mut String, root: &Path, category: Option<&RenderedCategory>) {
    out.push_str("<div class='charts'>\n");
    if let Some(category) = category {
        for (index, chart) in category.charts.iter().enumerate() {
            let Some(chart) = chart else {
                continue;
            };
            let _ = write!(
                out,
                concat!(
                    "<div class='chart'>\n",
                    "  <div class=\"chart_header\">{} <a href=\"{}\" target=\"_blank\" class=\"view_data\">View Data</a></div>\n",
                    "  <img src=\"{}\"/>\n",
                    "</div>\n"
                ),
                encode_text(&chart.title),
                encode_double_quoted_attribute(&link(root, &chart.data_file)),
                encode_double_quoted_attribute(&link(root, &chart.chart_file)),
            );
            if index % 2 != 0 {
                out.push_str("<div class='clear'></div>\n");
            }
        }
    }
    out.push_str("</div><div class='clear'></div><div class='category_end'></div>\n");
}

/// Builds the report page. Sections come first in configured order, then any
/// category no section mentions, under its own name.
pub fn render_html(
    root: &Path,
    config: &ReportConfig,
    rendered: &[RenderedCategory],
    generated: &str,
) -> String {
    let find = |name: &str| rendered.iter().find(|c| c.name == name);
    let mut out = String::new();

    let _ = write!(
        out,
        concat!(
            "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Reports</title>\n",
            "<style>\n{}</style>\n</head>\n<body>\n<div class=\"content\">\n",
            "<h1>Reports</h1>\n",
            "<p class=\"prop\">Directory: {}</p>\n",
            "<p class=\"prop\">Generated: {}</p>\n"
        ),
        STYLESHEET,
        encode_text(&root.display().to_string()),
        encode_text(generated),
    );

    for section in &config.sections {
        let _ = writeln!(out, "<h2>{}</h2>", encode_text(&section.title));
        if let Some(name) = &section.category {
            render_category(&mut out, root, find(name));
        }
        for sub in &section.subsections {
            let _ = writeln!(out, "<h3>{}</h3>", encode_text(&sub.title));
            render_category(&mut out, root, find(&sub.category));
        }
    }
    for category in config.unplaced_categories() {
        let _ = writeln!(out, "<h2>{}</h2>", encode_text(&category.name));
        render_category(&mut out, root, find(&category.name));
    }

    out.push_str("<div class=\"footer\">Generated by memreport</div>\n</div>\n</body>\n</html>\n");
    out
}

fn now() -> String {
    OffsetDateTime::now_utc()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] UTC"
        ))
        .unwrap_or_default()
}

/// Writes `report.html` into the run directory.
pub fn write_report(
    layout: &RunLayout,
    config: &ReportConfig,
    rendered: &[RenderedCategory],
) -> Result<PathBuf> {
    let path = layout.report_file();
    let html = render_html(layout.root(), config, rendered, &now());
    fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;

    let total: usize = rendered.iter().map(|c| c.charts.len()).sum();
    let present: usize = rendered.iter().map(RenderedCategory::present).sum();
    info!("wrote {} with {present} of {total} charts", path.display());
    Ok(path)
}

/// Normalizes `input_dir`, builds derived series, renders every chart and
/// writes the page. Returns the report path.
pub fn run_report(
    config: &ReportConfig,
    input_dir: &Path,
    layout: &RunLayout,
    plotter: &dyn Plotter,
) -> Result<PathBuf> {
    let data = layout.data();
    normalize_dir(input_dir, &data, &config.timestamp_file, &config.raw_pattern)?;
    build_derived(&data, &config.derived)?;
    let rendered = generate_charts(config, layout, plotter)?;
    write_report(layout, config, &rendered)
}

/// Opens `path` with the desktop's default handler. Failures are logged.
pub fn open_in_browser(path: &Path) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    if let Err(e) = Command::new(opener).arg(path).spawn() {
        warn!("failed to open {} with {opener}: {e}", path.display());
    }
}
