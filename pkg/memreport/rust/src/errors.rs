// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::path::PathBuf;
use thiserror::Error;

/// Conditions that abort a report run.
///
/// A missing *derived* input is not an error: the transforms return `None`
/// for that and the chart is skipped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("required file is missing: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("chart '{title}' has no metrics selected")]
    EmptySelection { title: String },

    #[error("{} has more data rows than timestamps (row {row}, {available} timestamps)", path.display())]
    TimestampOutOfRange {
        path: PathBuf,
        row: usize,
        available: usize,
    },

    #[error("invalid timestamp '{value}' in {}", path.display())]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("invalid number '{value}' in {} (row {row}, column {column})", path.display())]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        column: usize,
        value: String,
    },
}
