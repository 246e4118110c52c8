// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::errors::Error;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// One CSV record. Row 0 of every series is its header.
pub type Row = Vec<String>;

const DATA_EXTENSION: &str = "data";

/// Directory holding one `<metric>.data` file per series.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, metric: &str) -> PathBuf {
        self.root
            .join(format!("{}.{DATA_EXTENSION}", file_stem(metric)))
    }

    pub fn exists(&self, metric: &str) -> bool {
        self.path(metric).is_file()
    }

    pub fn read(&self, metric: &str) -> Result<Vec<Row>> {
        read_rows(&self.path(metric))
    }

    pub fn write(&self, metric: &str, rows: &[Row]) -> Result<PathBuf> {
        let path = self.path(metric);
        write_rows(&path, rows)?;
        Ok(path)
    }
}

/// File stem used for `metric`. Dots are kept as namespace separators;
/// path separators are not allowed in a file name.
pub fn file_stem(metric: &str) -> String {
    metric.replace(['/', '\\'], "_")
}

pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub fn write_rows(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Relative time in seconds, always with a fractional part (`0.0`, `1.234`).
pub fn format_seconds(seconds: f64) -> String {
    let text = seconds.to_string();
    if text.contains(['.', 'e', 'N', 'i']) {
        text
    } else {
        format!("{text}.0")
    }
}

/// A numeric field. Counters stay integral; anything with a fraction is a float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn parse(field: &str) -> Option<Number> {
        let field = field.trim();
        if let Ok(value) = field.parse::<i64>() {
            return Some(Number::Int(value));
        }
        field.parse::<f64>().ok().map(Number::Float)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    pub fn minus(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 - b as f64)),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn plus(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map(Number::Int)
                .unwrap_or(Number::Float(a as f64 + b as f64)),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{value}"),
            Number::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Numeric value of `row[column]`; `row_index` and `path` only feed the error.
pub fn number_at(row: &[String], column: usize, row_index: usize, path: &Path) -> Result<Number> {
    let field = row.get(column).map(String::as_str).unwrap_or_default();
    Number::parse(field).ok_or_else(|| {
        Error::InvalidNumber {
            path: path.to_path_buf(),
            row: row_index,
            column,
            value: field.to_string(),
        }
        .into()
    })
}
