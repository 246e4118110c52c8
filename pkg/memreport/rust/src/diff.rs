// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::series::{DataDir, number_at};
use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;

/// Writes `target` as a copy of `source` where `column` holds the change
/// since the previous row instead of the running value.
///
/// The first data row has no predecessor and keeps its value. Returns
/// `Ok(None)` without writing anything when `source` does not exist.
pub fn diff(data: &DataDir, source: &str, target: &str, column: usize) -> Result<Option<PathBuf>> {
    let source_path = data.path(source);
    if !source_path.is_file() {
        warn!("data file {} is not found", source_path.display());
        return Ok(None);
    }

    info!("generating diff data for column {column} from {source}");
    let mut rows = data.read(source)?;
    let mut previous = None;
    for (index, row) in rows.iter_mut().enumerate().skip(1) {
        let value = number_at(row, column, index, &source_path)?;
        let delta = match previous {
            Some(prev) => value.minus(prev),
            None => value,
        };
        previous = Some(value);
        row[column] = delta.to_string();
    }

    data.write(target, &rows).map(Some)
}
