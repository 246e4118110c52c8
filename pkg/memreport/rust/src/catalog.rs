// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Built-in report definitions for the allocator samples.
//!
//! Raw series written by the sampler:
//! - `cpu`, `memory`, `memory.spaces`
//! - `vm.*`: allocation/free timings and io counters of the virtual memory
//! - `vmtable.*`: block table counters and timings
//!
//! Timing series share one layout: column 2 is the max (p100), 3 and 4 the
//! mean and median, 7 and 8 the p99 and p99.9.

use crate::column::{ColumnRef, Selection, indexed};
use crate::config::{Category, ChartSpec, DerivedStep, Section, Subsection};

/// Counters that are also charted as "since last check".
const DIFFED: &[&str] = &[
    "memory.spaces",
    "vm.io.reads",
    "vm.io.writes",
    "vmtable.totalFrees",
    "vmtable.totalAllocations",
    "vmtable.failedAllocations",
    "vmtable.failedFrees",
    "vmtable.loopsToFindFitBlock",
    "vmtable.fragmentation",
];

/// Diffed counters that are also summed per second.
const PER_SECOND: &[&str] = &[
    "vmtable.loopsToFindFitBlock",
    "vmtable.totalAllocations",
    "vmtable.failedAllocations",
    "vmtable.totalFrees",
    "memory.spaces",
];

pub fn derived_steps() -> Vec<DerivedStep> {
    let diffs = DIFFED.iter().map(|metric| DerivedStep::Diff {
        source: metric.to_string(),
        target: format!("{metric}.diff"),
        column: 1,
    });
    let sums = PER_SECOND.iter().map(|metric| DerivedStep::Aggregate {
        source: format!("{metric}.diff"),
        target: format!("{metric}.diff.s"),
        time_column: 0,
        window_secs: 1.0,
        sum_column: 1,
    });
    let percentage = DerivedStep::Percentage {
        target: "vmtable.failedToTotalAllocationsPercentage".to_string(),
        metrics: pair(
            "vmtable.totalAllocations.diff.s",
            "total",
            "vmtable.failedAllocations.diff.s",
            "failed",
        ),
        numerator: 2,
        denominator: 1,
        title: "failed_to_total".to_string(),
    };

    diffs.chain(sums).chain([percentage]).collect()
}

fn single(metric: &str, columns: &[usize]) -> Selection {
    Selection::new().with(metric, indexed(columns))
}

fn pair(first: &str, first_name: &str, second: &str, second_name: &str) -> Selection {
    Selection::new()
        .with(first, vec![ColumnRef::named(1, first_name)])
        .with(second, vec![ColumnRef::named(1, second_name)])
}

fn chart(title: &str, ylabel: &str, metrics: Selection) -> ChartSpec {
    ChartSpec::new(title, ylabel, metrics)
}

/// Mean/median and p99/p99.9/p100 charts for a timing series.
fn timings(title: &str, metric: &str) -> [ChartSpec; 2] {
    [
        chart(title, "time (ms)", single(metric, &[3, 4])),
        chart(
            &format!("{title} p99, p99.9, p100"),
            "time (ms)",
            single(metric, &[7, 8, 2]),
        ),
    ]
}

fn category(name: &str, charts: Vec<ChartSpec>) -> Category {
    Category {
        name: name.to_string(),
        charts,
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category(
            "general",
            vec![
                chart("CPU", "cpu", single("cpu", &[1])),
                chart("Memory", "Mem (KB)", single("memory", &[1])),
            ],
        ),
        category(
            "memory",
            vec![
                chart("Memory: Spaces", "# of spaces", single("memory.spaces", &[1])),
                chart(
                    "Memory: Spaces Since Last Check",
                    "# of spaces",
                    single("memory.spaces.diff", &[1]),
                ),
                chart(
                    "Memory: Spaces Since Last Check (1s)",
                    "# of spaces",
                    single("memory.spaces.diff.s", &[1]),
                ),
            ],
        ),
        category(
            "vm",
            [
                timings("VM: Allocation Time", "vm.allocationTime"),
                timings("VM: Free Time", "vm.freeTime"),
            ]
            .concat(),
        ),
        category(
            "vm.io",
            [
                vec![
                    chart("VM: # of Reads", "", single("vm.io.reads", &[1])),
                    chart(
                        "VM: # of Reads Since Last Check",
                        "",
                        single("vm.io.reads.diff", &[1]),
                    ),
                    chart("VM: # of Writes", "", single("vm.io.writes", &[1])),
                    chart(
                        "VM: # of Writes Since Last Check",
                        "",
                        single("vm.io.writes.diff", &[1]),
                    ),
                ],
                timings("VM: Read Time", "vm.io.readTime").to_vec(),
                timings("VM: Write Time", "vm.io.writeTime").to_vec(),
            ]
            .concat(),
        ),
        category(
            "vmtable.size",
            vec![
                chart(
                    "VMTable: Used vs. Free",
                    "Mem (bytes)",
                    pair("vmtable.usedSize", "usedSize", "vmtable.freeSize", "freeSize"),
                ),
                chart(
                    "VMTable: Free Blocks",
                    "# of blocks",
                    single("vmtable.freeBlocksCount", &[1]),
                ),
            ],
        ),
        category(
            "vmtable.block",
            vec![
                chart(
                    "VMTable: Used Blocks",
                    "# of blocks",
                    single("vmtable.usedBlocksCount", &[1]),
                ),
                chart(
                    "VMTable: Free Blocks",
                    "# of blocks",
                    single("vmtable.freeBlocksCount", &[1]),
                ),
                chart(
                    "VMTable: Used Blocks vs Free Blocks",
                    "# of blocks",
                    pair(
                        "vmtable.usedBlocksCount",
                        "usedBlocks",
                        "vmtable.freeBlocksCount",
                        "freeBlocks",
                    ),
                ),
                chart(
                    "VMTable: Fragmentation",
                    "",
                    single("vmtable.fragmentation", &[1]),
                ),
                chart(
                    "VMTable: Fragmentation Since Prev Check",
                    "",
                    single("vmtable.fragmentation.diff", &[1]),
                ),
            ],
        ),
        category(
            "vmtable.alloc",
            [
                vec![
                    chart(
                        "VMTable: Total Allocations",
                        "# of alloc",
                        single("vmtable.totalAllocations", &[1]),
                    ),
                    chart(
                        "VMTable: Total Allocations Since Last Check",
                        "# of alloc",
                        single("vmtable.totalAllocations.diff", &[1]),
                    ),
                    chart(
                        "VMTable: Total Allocations (1 sec period)",
                        "# of alloc",
                        single("vmtable.totalAllocations.diff.s", &[1]),
                    ),
                    chart(
                        "VMTable: Failed Allocations",
                        "# of alloc",
                        single("vmtable.failedAllocations", &[1]),
                    ),
                    chart(
                        "VMTable: Total Allocations vs Failed Allocations",
                        "# of alloc",
                        pair(
                            "vmtable.totalAllocations",
                            "total",
                            "vmtable.failedAllocations",
                            "failed",
                        ),
                    ),
                    chart(
                        "VMTable: Failed To Total Allocations",
                        "%",
                        single("vmtable.failedToTotalAllocationsPercentage", &[3]),
                    ),
                ],
                timings("VMTable: Allocation Time", "vmtable.allocationTime").to_vec(),
            ]
            .concat(),
        ),
        category(
            "vmtable.free",
            [
                vec![
                    chart(
                        "VMTable: Total Frees",
                        "# of frees",
                        single("vmtable.totalFrees", &[1]),
                    ),
                    chart(
                        "VMTable: Total Frees Since Last Check",
                        "# of frees",
                        single("vmtable.totalFrees.diff", &[1]),
                    ),
                    chart(
                        "VMTable: Total Frees (1 sec period)",
                        "# of frees",
                        single("vmtable.totalFrees.diff.s", &[1]),
                    ),
                    chart(
                        "VMTable: Failed Frees",
                        "# of frees",
                        single("vmtable.failedFrees", &[1]),
                    ),
                    chart(
                        "VMTable: Total Frees vs Failed Frees",
                        "# of frees",
                        pair("vmtable.totalFrees", "total", "vmtable.failedFrees", "failed"),
                    ),
                ],
                timings("VMTable: Free Time", "vmtable.freeTime").to_vec(),
            ]
            .concat(),
        ),
        category(
            "vmtable.alloc_vs_free",
            vec![
                chart(
                    "VMTable: Total Allocations vs Total Frees",
                    "# of alloc/free",
                    pair("vmtable.totalAllocations", "alloc", "vmtable.totalFrees", "free"),
                ),
                chart(
                    "VMTable: Allocations vs Frees",
                    "# of alloc/free",
                    pair(
                        "vmtable.totalAllocations.diff",
                        "alloc",
                        "vmtable.totalFrees.diff",
                        "free",
                    ),
                ),
                chart(
                    "VMTable: Allocations vs Frees (1 sec period)",
                    "# of alloc/free",
                    pair(
                        "vmtable.totalAllocations.diff.s",
                        "alloc",
                        "vmtable.totalFrees.diff.s",
                        "free",
                    ),
                ),
            ],
        ),
        category(
            "vmtable.loops",
            vec![
                chart(
                    "VMTable: Total Loops to find fit block for alloc",
                    "# of loops",
                    single("vmtable.loopsToFindFitBlock", &[1]),
                ),
                chart(
                    "VMTable: Loops to find fit block for alloc",
                    "# of loops",
                    single("vmtable.loopsToFindFitBlock.diff", &[1]),
                ),
                chart(
                    "VMTable: Loops to find fit block for alloc (1 sec period)",
                    "# of loops",
                    single("vmtable.loopsToFindFitBlock.diff.s", &[1]),
                ),
            ],
        ),
    ]
}

fn sub(title: &str, category: &str) -> Subsection {
    Subsection {
        title: title.to_string(),
        category: category.to_string(),
    }
}

pub fn sections() -> Vec<Section> {
    vec![
        Section {
            title: "General".to_string(),
            category: Some("general".to_string()),
            subsections: Vec::new(),
        },
        Section {
            title: "Memory".to_string(),
            category: Some("memory".to_string()),
            subsections: Vec::new(),
        },
        Section {
            title: "VM".to_string(),
            category: Some("vm".to_string()),
            subsections: vec![sub("IO", "vm.io")],
        },
        Section {
            title: "VM Table".to_string(),
            category: None,
            subsections: vec![
                sub("Used/Free", "vmtable.size"),
                sub("Blocks", "vmtable.block"),
                sub("Allocations", "vmtable.alloc"),
                sub("Frees", "vmtable.free"),
                sub("Allocations/Frees", "vmtable.alloc_vs_free"),
                sub("Allocation loops", "vmtable.loops"),
            ],
        },
    ]
}
