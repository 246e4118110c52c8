// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Time-bucketed reduction of a series, e.g. allocations per second.

use crate::series::{DataDir, Number, Row, number_at};
use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use std::path::PathBuf;

/// Grouping predicate over the time column of a series.
///
/// A window is anchored at the time of its first row; a row at or beyond
/// `window_start + width` closes it and anchors the next one.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    column: usize,
    width: f64,
    window_start: f64,
    is_open: bool,
}

impl TimeWindow {
    pub fn new(column: usize, width: f64) -> Self {
        Self {
            column,
            width,
            window_start: 0.0,
            is_open: false,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Feeds the time of the next row. Returns `true` when the row starts a
    /// new window, i.e. everything seen before it forms a complete group.
    pub fn observe(&mut self, time: f64) -> bool {
        if !self.is_open {
            self.window_start = time;
            self.is_open = true;
            return false;
        }
        if time - self.window_start >= self.width {
            self.window_start = time;
            return true;
        }
        false
    }
}

/// Folds the rows of one window into a single output row.
pub trait Reducer {
    /// With no accumulator, `row` starts a new one verbatim. Otherwise `row`
    /// is folded into `accumulator` and the result returned.
    fn fold(&self, row: Row, accumulator: Option<Row>) -> Result<Row>;
}

/// Sums `column` over the window; every other column comes from the latest row.
#[derive(Debug, Clone, Copy)]
pub struct Sum {
    pub column: usize,
}

impl Reducer for Sum {
    fn fold(&self, row: Row, accumulator: Option<Row>) -> Result<Row> {
        let Some(mut acc) = accumulator else {
            return Ok(row);
        };

        let total = self.value(&acc)?.plus(self.value(&row)?);
        for (index, field) in row.into_iter().enumerate() {
            if index == self.column {
                continue;
            }
            match acc.get_mut(index) {
                Some(slot) => *slot = field,
                None => acc.push(field),
            }
        }
        if let Some(slot) = acc.get_mut(self.column) {
            *slot = total.to_string();
        }
        Ok(acc)
    }
}

impl Sum {
    fn value(&self, row: &[String]) -> Result<Number> {
        let field = row.get(self.column).map(String::as_str).unwrap_or_default();
        Number::parse(field)
            .ok_or_else(|| anyhow!("non-numeric value '{field}' in column {}", self.column))
    }
}

/// Writes `target` with one row per time window of `source`, reduced by
/// `reducer`. The header is copied and a trailing partial window is kept.
///
/// Returns `Ok(None)` without writing anything when `source` does not exist.
pub fn aggregate(
    data: &DataDir,
    source: &str,
    target: &str,
    mut window: TimeWindow,
    reducer: &dyn Reducer,
) -> Result<Option<PathBuf>> {
    let source_path = data.path(source);
    if !source_path.is_file() {
        warn!("data file {} is not found", source_path.display());
        return Ok(None);
    }

    info!(
        "aggregating data for {source} into {target} ({}s windows on column {})",
        window.width(),
        window.column()
    );

    let mut rows = data.read(source)?.into_iter();
    let mut output: Vec<Row> = rows.next().into_iter().collect();
    let mut bucket: Option<Row> = None;

    for (offset, row) in rows.enumerate() {
        let index = offset + 1;
        let time = number_at(&row, window.column(), index, &source_path)?.as_f64();
        if window.observe(time)
            && let Some(done) = bucket.take()
        {
            output.push(done);
        }
        let folded = reducer
            .fold(row, bucket.take())
            .with_context(|| format!("aggregating row {index} of {}", source_path.display()))?;
        bucket = Some(folded);
    }
    output.extend(bucket);

    data.write(target, &output).map(Some)
}
