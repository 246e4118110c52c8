// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Import of raw samples: absolute tick numbers in column 0 are replaced by
//! seconds elapsed since the first sample.

use crate::errors::Error;
use crate::series::{DataDir, Row, format_seconds, read_rows};
use anyhow::{Context, Result};
use glob_match::glob_match;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMESTAMP_FILE: &str = "timestamp.csv";
pub const DEFAULT_RAW_PATTERN: &str = "*.csv";

const COMMENT_MARKER: char = '#';

/// Reads the reference timestamps file and returns, for every sample, the
/// seconds elapsed since the first one. The first value is always `0.0`.
///
/// Each row is `<tick>,<absolute milliseconds>`; rows starting with `#` are
/// comments.
pub fn read_timestamps(path: &Path) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(COMMENT_MARKER as u8))
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut epoch = None;
    let mut offsets = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("reading {}", path.display()))?;
        let invalid = || Error::InvalidTimestamp {
            path: path.to_path_buf(),
            value: record.iter().collect::<Vec<_>>().join(","),
        };
        let millis: i64 = record
            .get(1)
            .and_then(|field| field.parse().ok())
            .ok_or_else(invalid)?;
        let epoch = *epoch.get_or_insert(millis);
        let elapsed = millis.checked_sub(epoch).ok_or_else(invalid)?;
        offsets.push(elapsed as f64 / 1000.0);
    }
    Ok(offsets)
}

/// Metric name of a raw file: its file name without the last extension.
pub fn metric_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => Some(stem.to_string()),
        _ => None,
    }
}

/// Converts every raw file in `source_dir` matching `raw_pattern` into a
/// normalized series in `data`. Returns the imported metric names.
///
/// The reference timestamps file is required; a raw file with more samples
/// than timestamps aborts the import.
pub fn normalize_dir(
    source_dir: &Path,
    data: &DataDir,
    timestamp_file: &str,
    raw_pattern: &str,
) -> Result<Vec<String>> {
    let reference = source_dir.join(timestamp_file);
    if !reference.is_file() {
        return Err(Error::MissingFile { path: reference }.into());
    }

    let timestamps = read_timestamps(&reference)?;
    info!(
        "read {} timestamps from {}",
        timestamps.len(),
        reference.display()
    );

    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read source directory: {}", source_dir.display()))?;

    let mut raw_files: Vec<PathBuf> = entries
        .filter_map(|e| match e {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!("skipping unreadable entry in {}: {e}", source_dir.display());
                None
            }
        })
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name != timestamp_file && glob_match(raw_pattern, name))
        })
        .collect();
    raw_files.sort();

    let mut metrics = Vec::with_capacity(raw_files.len());
    for path in raw_files {
        let Some(metric) = metric_name(&path) else {
            debug!("skipping {}: no metric name", path.display());
            continue;
        };
        let rows = normalize_rows(read_rows(&path)?, &timestamps, &path)?;
        let target = data.write(&metric, &rows)?;
        debug!("normalized {} into {}", path.display(), target.display());
        metrics.push(metric);
    }

    info!(
        "imported {} metric file(s) into {}",
        metrics.len(),
        data.root().display()
    );
    Ok(metrics)
}

/// Strips the comment marker from the header and replaces column 0 of data
/// row `i` with `timestamps[i - 1]`. Alignment is positional.
fn normalize_rows(mut rows: Vec<Row>, timestamps: &[f64], path: &Path) -> Result<Vec<Row>> {
    for (index, row) in rows.iter_mut().enumerate() {
        if index == 0 {
            if let Some(first) = row.first_mut()
                && let Some(stripped) = first.strip_prefix(COMMENT_MARKER)
            {
                *first = stripped.trim_start().to_string();
            }
            continue;
        }

        let timestamp = timestamps
            .get(index - 1)
            .ok_or_else(|| Error::TimestampOutOfRange {
                path: path.to_path_buf(),
                row: index,
                available: timestamps.len(),
            })?;
        let seconds = format_seconds(*timestamp);
        match row.first_mut() {
            Some(first) => *first = seconds,
            None => row.push(seconds),
        }
    }
    Ok(rows)
}
