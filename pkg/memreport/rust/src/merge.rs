// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Horizontal merge of several series keyed by their timestamp column.
//!
//! Every source owns a contiguous block of output columns (see
//! [`Selection::layout`]). Rows from different sources that share a
//! timestamp land in the same output row; a timestamp missing from a source
//! leaves that source's block empty.

use crate::column::Selection;
use crate::errors::Error;
use crate::series::{DataDir, Number, Row};
use anyhow::Result;
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;

/// Post-processing applied to every merged row before it is written.
pub trait MergeHook {
    /// `index` is 0 for the header and counts data rows from 1 in output order.
    fn apply(&self, row: &mut Row, index: usize);
}

/// Appends `numerator / denominator * 100` as a new column titled `title`.
///
/// The value is left empty when either field is missing or not a number, or
/// when the denominator is zero.
#[derive(Debug, Clone)]
pub struct Percentage {
    pub numerator: usize,
    pub denominator: usize,
    pub title: String,
}

impl MergeHook for Percentage {
    fn apply(&self, row: &mut Row, index: usize) {
        if index == 0 {
            row.push(self.title.clone());
            return;
        }

        let value = |column: usize| {
            row.get(column)
                .and_then(|field| Number::parse(field))
                .map(Number::as_f64)
        };
        let percentage = match (value(self.numerator), value(self.denominator)) {
            (Some(numerator), Some(denominator)) if denominator != 0.0 => {
                (numerator / denominator * 100.0).to_string()
            }
            _ => String::new(),
        };
        row.push(percentage);
    }
}

/// Merges the selected columns of every series in `selection` into `target`.
///
/// All-or-nothing: if any source is missing, returns `Ok(None)` and writes
/// nothing. Output rows are unique per timestamp and sorted by its numeric
/// value, with the header first.
pub fn merge(
    data: &DataDir,
    selection: &Selection,
    target: &str,
    hook: Option<&dyn MergeHook>,
) -> Result<Option<PathBuf>> {
    if let Some(missing) = selection.metrics().find(|metric| !data.exists(metric)) {
        warn!(
            "cannot combine data into {target}: data file {} is not found",
            data.path(missing).display()
        );
        return Ok(None);
    }

    info!(
        "combining data for [{}] into {target}",
        selection.metrics().collect::<Vec<_>>().join(", ")
    );

    let width = selection.merged_width();
    let mut header: Row = vec![String::new(); width];
    let mut by_time: HashMap<u64, (f64, Row)> = HashMap::new();

    for (position, ((metric, columns), block)) in
        selection.iter().zip(selection.layout()).enumerate()
    {
        let source_path = data.path(metric);
        let mut rows = data.read(metric)?.into_iter();

        if let Some(source_header) = rows.next() {
            if position == 0 {
                header[0] = source_header.first().cloned().unwrap_or_default();
            }
            for (slot, column) in block.clone().zip(columns) {
                header[slot] =
                    column.header_label(source_header.get(column.index()).map(String::as_str));
            }
        }

        for row in rows {
            let Some(key) = row.first() else {
                continue;
            };
            let time = key
                .trim()
                .parse::<f64>()
                .map_err(|_| Error::InvalidTimestamp {
                    path: source_path.clone(),
                    value: key.clone(),
                })?;
            // `1` and `1.0` are the same instant; the first spelling seen is kept.
            let (_, merged) = by_time.entry((time + 0.0).to_bits()).or_insert_with(|| {
                let mut fresh = vec![String::new(); width];
                fresh[0] = key.clone();
                (time, fresh)
            });
            for (slot, column) in block.clone().zip(columns) {
                merged[slot] = row.get(column.index()).cloned().unwrap_or_default();
            }
        }
    }

    let mut sorted: Vec<(f64, Row)> = by_time.into_values().collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut output = Vec::with_capacity(sorted.len() + 1);
    output.push(header);
    output.extend(sorted.into_iter().map(|(_, row)| row));

    if let Some(hook) = hook {
        for (index, row) in output.iter_mut().enumerate() {
            hook.apply(row, index);
        }
    }

    data.write(target, &output).map(Some)
}
