// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Offline report generator for the virtual-memory allocator samples.
//!
//! Raw CSV samples are normalized into `.data` series, derived series are
//! computed from them (diffs, per-second sums, percentages), each configured
//! chart is rendered by an external plotter and the results are collected
//! into a single HTML page.

pub mod aggregate;
pub mod catalog;
pub mod column;
pub mod compare;
pub mod config;
pub mod derived;
pub mod diff;
pub mod errors;
pub mod layout;
pub mod merge;
pub mod normalize;
pub mod plot;
pub mod report;
pub mod series;

pub use column::{ColumnRef, Selection};
pub use config::ReportConfig;
pub use errors::Error;
pub use plot::{Chart, CommandPlotter, PlotRequest, Plotter};
pub use series::{DataDir, Row};
