// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::catalog;
use crate::column::Selection;
use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const LOG_LEVEL_ENV: &str = "MEMREPORT_LOG_LEVEL";
pub const DEFAULT_PLOTTER: &str = "./plot.sh";

fn default_xlabel() -> String {
    "time (s)".to_string()
}

fn default_window_secs() -> f64 {
    1.0
}

/// One chart of the report.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    #[serde(default = "default_xlabel")]
    pub xlabel: String,
    #[serde(default)]
    pub ylabel: String,
    pub metrics: Selection,
}

impl ChartSpec {
    pub fn new(title: impl Into<String>, ylabel: impl Into<String>, metrics: Selection) -> Self {
        Self {
            title: title.into(),
            xlabel: default_xlabel(),
            ylabel: ylabel.into(),
            metrics,
        }
    }
}

/// Named group of charts rendered together on the page.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    pub charts: Vec<ChartSpec>,
}

/// Top-level heading of the page. A section shows its own category (if any)
/// followed by its subsections.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subsection {
    pub title: String,
    pub category: String,
}

/// A series computed from other series before any chart is drawn.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DerivedStep {
    Diff {
        source: String,
        target: String,
        column: usize,
    },
    Aggregate {
        source: String,
        target: String,
        #[serde(default)]
        time_column: usize,
        #[serde(default = "default_window_secs")]
        window_secs: f64,
        sum_column: usize,
    },
    Percentage {
        target: String,
        metrics: Selection,
        numerator: usize,
        denominator: usize,
        title: String,
    },
}

impl DerivedStep {
    pub fn target(&self) -> &str {
        match self {
            DerivedStep::Diff { target, .. }
            | DerivedStep::Aggregate { target, .. }
            | DerivedStep::Percentage { target, .. } => target,
        }
    }
}

/// Everything a report run needs besides its input and output paths.
///
/// Fields missing from a YAML file keep their built-in values, so a file
/// may override only e.g. `plotter`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub log_level: Option<String>,
    pub plotter: PathBuf,
    pub timestamp_file: String,
    pub raw_pattern: String,
    pub derived: Vec<DerivedStep>,
    pub categories: Vec<Category>,
    pub sections: Vec<Section>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            plotter: PathBuf::from(DEFAULT_PLOTTER),
            timestamp_file: crate::normalize::DEFAULT_TIMESTAMP_FILE.to_string(),
            raw_pattern: crate::normalize::DEFAULT_RAW_PATTERN.to_string(),
            derived: catalog::derived_steps(),
            categories: catalog::categories(),
            sections: catalog::sections(),
        }
    }
}

impl ReportConfig {
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Categories no section places on the page. The report appends them
    /// after the configured sections.
    pub fn unplaced_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|category| {
            !self.sections.iter().any(|section| {
                section.category.as_deref() == Some(category.name.as_str())
                    || section
                        .subsections
                        .iter()
                        .any(|sub| sub.category == category.name)
            })
        })
    }
}

/// Loads the report configuration, or the built-in one when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    let Some(path) = path else {
        debug!("no config file given, using built-in report definitions");
        return Ok(ReportConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config: ReportConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    for section in &config.sections {
        let referenced = section
            .category
            .iter()
            .chain(section.subsections.iter().map(|sub| &sub.category));
        for name in referenced {
            if config.category(name).is_none() {
                warn!("section '{}' refers to unknown category '{name}'", section.title);
            }
        }
    }
    Ok(config)
}

/// Parse a log level string into a log::Level.
/// Unknown levels silently default to Info.
pub fn parse_log_level(level: &str) -> log::Level {
    match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "info" => log::Level::Info,
        "warn" | "warning" => log::Level::Warn,
        "error" | "critical" => log::Level::Error,
        "off" => log::Level::Error, // log::Level has no "off", keep errors only
        _ => log::Level::Info,
    }
}

/// Gets the log level.
/// Priority: command line > MEMREPORT_LOG_LEVEL > config file > Info
pub fn get_log_level(flag: Option<&str>, config: &ReportConfig) -> log::Level {
    if let Some(level) = flag {
        return parse_log_level(level);
    }

    if let Ok(level) = env::var(LOG_LEVEL_ENV) {
        return parse_log_level(&level);
    }

    config
        .log_level
        .as_deref()
        .map(parse_log_level)
        .unwrap_or(log::Level::Info)
}
