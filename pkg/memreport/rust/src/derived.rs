// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use crate::aggregate::{self, Sum, TimeWindow};
use crate::config::DerivedStep;
use crate::diff;
use crate::merge::{self, Percentage};
use crate::series::DataDir;
use anyhow::Result;
use log::{info, warn};

/// Outcome of [`build_derived`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DerivedSummary {
    pub built: Vec<String>,
    pub unavailable: Vec<String>,
}

/// Runs `steps` in order. Later steps may read what earlier ones wrote.
///
/// A step whose inputs are missing is recorded as unavailable; any other
/// failure stops the run.
pub fn build_derived(data: &DataDir, steps: &[DerivedStep]) -> Result<DerivedSummary> {
    let mut summary = DerivedSummary::default();

    for step in steps {
        let written = match step {
            DerivedStep::Diff {
                source,
                target,
                column,
            } => diff::diff(data, source, target, *column)?,
            DerivedStep::Aggregate {
                source,
                target,
                time_column,
                window_secs,
                sum_column,
            } => aggregate::aggregate(
                data,
                source,
                target,
                TimeWindow::new(*time_column, *window_secs),
                &Sum {
                    column: *sum_column,
                },
            )?,
            DerivedStep::Percentage {
                target,
                metrics,
                numerator,
                denominator,
                title,
            } => {
                let hook = Percentage {
                    numerator: *numerator,
                    denominator: *denominator,
                    title: title.clone(),
                };
                merge::merge(data, metrics, target, Some(&hook))?
            }
        };

        let target = step.target().to_string();
        match written {
            Some(_) => summary.built.push(target),
            None => {
                warn!("derived series {target} is unavailable");
                summary.unavailable.push(target);
            }
        }
    }

    info!(
        "built {} derived series, {} unavailable",
        summary.built.len(),
        summary.unavailable.len()
    );
    Ok(summary)
}
