// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

mod helpers;

use helpers::{RecordingPlotter, single_subdir, write_file, write_sample};
use memreport::compare::{RunSource, compare_runs};
use memreport::config::load_config;
use memreport::diff::diff;
use memreport::layout::RunLayout;
use memreport::normalize::normalize_dir;
use memreport::report::run_report;
use memreport::{DataDir, Error, ReportConfig};
use std::fs;

fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|r| r.iter().map(|f| f.to_string()).collect())
        .collect()
}

// ===========================================================================
// Group 1: Import and transforms
// ===========================================================================

#[test]
fn test_normalize_then_diff() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_file(&input, "timestamp.csv", "#tick,ts\n1,5000\n2,6000\n");
    write_file(&input, "counter.csv", "#tick,value\n100,5\n200,7\n");
    let data = DataDir::new(dir.path().join("data"));
    fs::create_dir_all(data.root()).unwrap();

    let metrics = normalize_dir(&input, &data, "timestamp.csv", "*.csv").unwrap();
    assert_eq!(metrics, vec!["counter"]);
    assert_eq!(
        data.read("counter").unwrap(),
        rows(&[&["tick", "value"], &["0.0", "5"], &["1.0", "7"]])
    );

    diff(&data, "counter", "counter.diff", 1).unwrap().unwrap();
    assert_eq!(
        data.read("counter.diff").unwrap(),
        rows(&[&["tick", "value"], &["0.0", "5"], &["1.0", "2"]])
    );
}

#[test]
fn test_missing_timestamp_file_aborts_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_file(&input, "cpu.csv", "#tick,cpu\n0,1\n");
    let layout = RunLayout::create(dir.path().join("out")).unwrap();

    let err = run_report(
        &ReportConfig::default(),
        &input,
        &layout,
        &RecordingPlotter::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MissingFile { .. })
    ));
    assert!(!layout.report_file().exists());
}

#[test]
fn test_more_samples_than_timestamps_aborts_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_file(&input, "timestamp.csv", "0,1000\n");
    write_file(&input, "cpu.csv", "#tick,cpu\n0,1\n1,2\n");
    let layout = RunLayout::create(dir.path().join("out")).unwrap();

    let err = run_report(
        &ReportConfig::default(),
        &input,
        &layout,
        &RecordingPlotter::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::TimestampOutOfRange { row: 2, available: 1, .. })
    ));
}

// ===========================================================================
// Group 2: Full report
// ===========================================================================

#[test]
fn test_full_report_with_builtin_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_sample(&input);
    let layout = RunLayout::create(dir.path().join("out")).unwrap();
    let plotter = RecordingPlotter::default();

    let report = run_report(&ReportConfig::default(), &input, &layout, &plotter).unwrap();
    assert_eq!(report, layout.report_file());

    let data = layout.data();
    assert_eq!(
        data.read("vmtable.totalAllocations.diff.s").unwrap(),
        rows(&[&["tick", "count"], &["0.5", "300"], &["1.5", "700"]])
    );
    assert_eq!(
        data.read("vmtable.failedToTotalAllocationsPercentage")
            .unwrap(),
        rows(&[
            &["tick", "count total", "count failed", "failed_to_total"],
            &["0.5", "300", "20", "6.666666666666667"],
            &["1.5", "700", "100", "14.285714285714285"],
        ])
    );

    // Only charts whose series exist in the sample are drawn.
    assert_eq!(plotter.calls().len(), 12);
    let blocks = plotter.call("VMTable: Used Blocks vs Free Blocks").unwrap();
    assert_eq!(blocks.columns, vec![2, 3]);
    assert_eq!(
        blocks.output,
        layout.charts_dir().join("vmtable_used_blocks_vs_free_blocks.png")
    );
    let percentage = plotter.call("VMTable: Failed To Total Allocations").unwrap();
    assert_eq!(percentage.columns, vec![4]);
    assert!(plotter.call("VM: Allocation Time").is_none());

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.contains("<h2>VM Table</h2>"));
    assert!(html.contains("<h3>Allocations</h3>"));
    assert!(html.contains("src=\"charts/cpu.png\""));
    assert!(html.contains("href=\"data/vmtable.usedBlocksCount_vmtable.freeBlocksCount.data\""));
    assert!(!html.contains("VM: Allocation Time"));
}

#[test]
fn test_report_with_yaml_definitions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_sample(&input);
    let config_path = write_file(
        dir.path(),
        "report.yaml",
        r#"
derived:
  - kind: diff
    source: cpu
    target: cpu.diff
    column: 1
categories:
  - name: cpu
    charts:
      - title: "CPU & delta"
        metrics:
          cpu: [{index: 1, name: raw}]
          cpu.diff: [{index: 1, name: delta}]
sections:
  - title: Processor
    category: cpu
"#,
    );
    let config = load_config(Some(&config_path)).unwrap();
    let layout = RunLayout::create(dir.path().join("out")).unwrap();
    let plotter = RecordingPlotter::default();

    run_report(&config, &input, &layout, &plotter).unwrap();

    let calls = plotter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].data, layout.data().path("cpu_cpu.diff"));
    assert_eq!(
        layout.data().read("cpu_cpu.diff").unwrap()[0],
        vec!["tick", "cpu raw", "cpu delta"]
    );

    let html = fs::read_to_string(layout.report_file()).unwrap();
    assert!(html.contains("<h2>Processor</h2>"));
    assert!(html.contains("CPU &amp; delta"));
}

// ===========================================================================
// Group 3: Comparison
// ===========================================================================

#[test]
fn test_compare_two_runs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_sample(&input);

    let mut runs = Vec::new();
    for name in ["first", "second"] {
        let layout = RunLayout::create(dir.path().join("runs").join(name)).unwrap();
        run_report(
            &ReportConfig::default(),
            &input,
            &layout,
            &RecordingPlotter::default(),
        )
        .unwrap();
        runs.push(RunSource::new(layout.root(), None));
    }

    let layout = RunLayout::create(dir.path().join("cmp")).unwrap();
    let plotter = RecordingPlotter::default();
    compare_runs(&ReportConfig::default(), &runs, &layout, &plotter).unwrap();

    let cpu = plotter.call("CPU").unwrap();
    assert_eq!(cpu.columns, vec![2, 3]);
    assert_eq!(cpu.data, layout.data().path("cpu_0_cpu_1"));
    assert_eq!(
        layout.data().read("cpu_0_cpu_1").unwrap()[0],
        vec!["tick", "cpu first", "cpu second"]
    );
    assert!(layout.data().exists("vmtable.totalAllocations.diff.s_1"));
    assert!(plotter.call("VM: Allocation Time").is_none());
    assert!(layout.report_file().is_file());
}

// ===========================================================================
// Group 4: Binaries
// ===========================================================================

#[cfg(unix)]
#[test]
fn test_memreport_binary_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    write_sample(&dir.path().join("samples").join("concurrency"));
    let plotter = helpers::touch_plotter(dir.path());
    let output = dir.path().join("reports");

    let result = helpers::run_bin(
        env!("CARGO_BIN_EXE_memreport"),
        &[
            "--sample",
            "concurrency",
            "--path",
            dir.path().join("samples").to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--plotter",
            plotter.to_str().unwrap(),
        ],
    );
    assert!(
        result.status.success(),
        "memreport failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let run = single_subdir(&output.join("concurrency"));
    assert_eq!(run.file_name().unwrap().len(), 14);
    assert!(run.join("report.html").is_file());
    assert!(run.join("charts").join("cpu.png").is_file());
    assert!(run.join("data").join("cpu.data").is_file());
}

#[cfg(unix)]
#[test]
fn test_compare_binary_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input");
    write_sample(&input);
    let first = RunLayout::create(dir.path().join("first")).unwrap();
    run_report(
        &ReportConfig::default(),
        &input,
        &first,
        &RecordingPlotter::default(),
    )
    .unwrap();
    let plotter = helpers::touch_plotter(dir.path());
    let output = dir.path().join("cmp");

    let reports = format!("{},{}", first.root().display(), first.root().display());
    let result = helpers::run_bin(
        env!("CARGO_BIN_EXE_memreport-compare"),
        &[
            "--reports",
            &reports,
            "--alias",
            "a,b",
            "--path",
            output.to_str().unwrap(),
            "--plotter",
            plotter.to_str().unwrap(),
        ],
    );
    assert!(
        result.status.success(),
        "memreport-compare failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let run = single_subdir(&output);
    let header = &DataDir::new(run.join("data")).read("cpu_0_cpu_1").unwrap()[0];
    assert_eq!(header, &vec!["tick", "cpu a", "cpu b"]);
}

#[cfg(unix)]
#[test]
fn test_plot_script_passes_labels_as_gnuplot_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let bin = helpers::recording_gnuplot(dir.path());
    let script = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("scripts")
        .join("plot.sh");
    let title = "CPU `touch x` \" ; set output \"y";
    let path = format!(
        "{}:{}",
        bin.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let result = std::process::Command::new("sh")
        .arg(&script)
        .args([title, "time (s)", "$HOME", "out.png", "cpu.data", "2 3"])
        .current_dir(dir.path())
        .env("PATH", path)
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "plot.sh failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let args = fs::read_to_string(dir.path().join("gnuplot.args")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "-c");
    assert!(args[1].ends_with("plot.gp"));
    assert_eq!(
        &args[2..],
        &[title, "time (s)", "$HOME", "out.png", "cpu.data", "2 3"]
    );
    assert!(!dir.path().join("x").exists());

    let program = fs::read_to_string(script.with_file_name("plot.gp")).unwrap();
    assert!(program.contains("set title ARG1"));
    assert!(!program.contains("$1"));
}

#[test]
fn test_memreport_binary_requires_arguments() {
    let result = helpers::run_bin(env!("CARGO_BIN_EXE_memreport"), &["--sample", "x"]);
    assert!(!result.status.success());
}
