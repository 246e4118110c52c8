// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::series::DataDir;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

pub const DATA_DIR: &str = "data";
pub const CHARTS_DIR: &str = "charts";
pub const REPORT_FILE: &str = "report.html";

/// Output directory of one report run.
#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    /// Uses an existing run directory without creating anything.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates `root` with its data and charts directories.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self::open(root);
        for dir in [layout.data_dir(), layout.charts_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn data(&self) -> DataDir {
        DataDir::new(self.data_dir())
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.root.join(CHARTS_DIR)
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }
}

/// Name of a new run directory, e.g. `20260102150405` (UTC).
pub fn run_id() -> Result<String> {
    format_run_id(OffsetDateTime::now_utc())
}

fn format_run_id(at: OffsetDateTime) -> Result<String> {
    at.format(format_description!(
        "[year][month][day][hour][minute][second]"
    ))
    .context("failed to format run id")
}
