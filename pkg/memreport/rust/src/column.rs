// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use serde::Deserialize;
use serde::de::{Deserializer, MapAccess, Visitor};
use std::fmt;
use std::ops::Range;

/// A zero-based column of a metric series, optionally carrying a display label.
///
/// In YAML a bare integer is `Indexed`, a `{index, name}` map is `Named`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Indexed(usize),
    Named { index: usize, name: String },
}

impl ColumnRef {
    pub fn named(index: usize, name: impl Into<String>) -> Self {
        ColumnRef::Named {
            index,
            name: name.into(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            ColumnRef::Indexed(index) | ColumnRef::Named { index, .. } => *index,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ColumnRef::Indexed(_) => None,
            ColumnRef::Named { name, .. } => Some(name),
        }
    }

    /// Header label for this column in a merged series, built from the
    /// source header field at `index()` when there is one.
    pub fn header_label(&self, source_header: Option<&str>) -> String {
        match (self.name(), source_header) {
            (Some(name), Some(header)) => format!("{header} {name}"),
            (Some(name), None) => name.to_string(),
            (None, Some(header)) => header.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Same column with `suffix` appended to its label. Unnamed columns take
    /// `suffix` as their label.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        match self.name() {
            Some(name) => ColumnRef::named(self.index(), format!("{name} {suffix}")),
            None => ColumnRef::named(self.index(), suffix),
        }
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Indexed(index)
    }
}

/// Unlabelled references for each of `indices`.
pub fn indexed(indices: &[usize]) -> Vec<ColumnRef> {
    indices.iter().copied().map(ColumnRef::Indexed).collect()
}

/// Ordered mapping from metric name to the columns drawn from it.
///
/// Order matters: it fixes the column blocks of a merged series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<(String, Vec<ColumnRef>)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, metric: impl Into<String>, columns: Vec<ColumnRef>) -> Self {
        self.insert(metric, columns);
        self
    }

    /// Adds `metric`, replacing its columns if it is already selected.
    pub fn insert(&mut self, metric: impl Into<String>, columns: Vec<ColumnRef>) {
        let metric = metric.into();
        match self.entries.iter_mut().find(|(m, _)| *m == metric) {
            Some((_, existing)) => *existing = columns,
            None => self.entries.push((metric, columns)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ColumnRef])> {
        self.entries
            .iter()
            .map(|(metric, columns)| (metric.as_str(), columns.as_slice()))
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(metric, _)| metric.as_str())
    }

    /// Name of the series produced by merging this selection.
    pub fn joined_name(&self) -> String {
        self.metrics().collect::<Vec<_>>().join("_")
    }

    /// Output column block of each source in a merged row. Column 0 holds
    /// the timestamp, so the first block starts at 1.
    pub fn layout(&self) -> Vec<Range<usize>> {
        let mut start = 1;
        self.entries
            .iter()
            .map(|(_, columns)| {
                let block = start..start + columns.len();
                start = block.end;
                block
            })
            .collect()
    }

    /// Number of fields in a merged row, timestamp included.
    pub fn merged_width(&self) -> usize {
        1 + self.entries.iter().map(|(_, c)| c.len()).sum::<usize>()
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SelectionVisitor;

        impl<'de> Visitor<'de> for SelectionVisitor {
            type Value = Selection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of metric name to column list")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Selection, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut selection = Selection::new();
                while let Some((metric, columns)) = map.next_entry::<String, Vec<ColumnRef>>()? {
                    selection.insert(metric, columns);
                }
                Ok(selection)
            }
        }

        deserializer.deserialize_map(SelectionVisitor)
    }
}
