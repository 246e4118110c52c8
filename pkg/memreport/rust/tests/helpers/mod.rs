// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(dead_code)]

use memreport::{PlotRequest, Plotter};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

/// One plotter invocation as seen by [`RecordingPlotter`].
#[derive(Debug, Clone)]
pub struct PlotCall {
    pub title: String,
    pub output: PathBuf,
    pub data: PathBuf,
    pub columns: Vec<usize>,
}

/// Plotter that records every request and writes a placeholder image.
#[derive(Default)]
pub struct RecordingPlotter {
    calls: Mutex<Vec<PlotCall>>,
}

impl RecordingPlotter {
    pub fn calls(&self) -> Vec<PlotCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call(&self, title: &str) -> Option<PlotCall> {
        self.calls().into_iter().find(|call| call.title == title)
    }
}

impl Plotter for RecordingPlotter {
    fn render(&self, request: &PlotRequest) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(PlotCall {
            title: request.title.to_string(),
            output: request.output.to_path_buf(),
            data: request.data.to_path_buf(),
            columns: request.columns.to_vec(),
        });
        std::fs::write(request.output, b"\x89PNG")?;
        Ok(())
    }
}

/// Write `contents` to `dir/name`, creating `dir` if needed.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    std::fs::create_dir_all(dir)
        .unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
    let path = dir.join(name);
    std::fs::write(&path, contents)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    path
}

/// A small sample directory: four timestamps 500 ms apart and a handful of
/// allocator counters.
pub fn write_sample(dir: &Path) {
    write_file(
        dir,
        "timestamp.csv",
        "# tick,timestamp\n0,1356300000000\n1,1356300000500\n2,1356300001000\n3,1356300001500\n",
    );
    write_file(dir, "cpu.csv", "# tick,cpu\n0,12\n1,40\n2,38\n3,20\n");
    write_file(dir, "memory.csv", "# tick,memory\n0,1024\n1,2048\n2,2048\n3,4096\n");
    write_file(
        dir,
        "vmtable.totalAllocations.csv",
        "# tick,count\n0,100\n1,300\n2,600\n3,1000\n",
    );
    write_file(
        dir,
        "vmtable.failedAllocations.csv",
        "# tick,count\n0,0\n1,20\n2,20\n3,120\n",
    );
    write_file(
        dir,
        "vmtable.usedBlocksCount.csv",
        "# tick,count\n0,1\n1,5\n2,9\n3,7\n",
    );
    write_file(
        dir,
        "vmtable.freeBlocksCount.csv",
        "# tick,count\n0,9\n1,5\n2,1\n3,3\n",
    );
}

/// Path of the only directory inside `dir`.
pub fn single_subdir(dir: &Path) -> PathBuf {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", dir.display()))
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_dir())
        .collect();
    assert_eq!(entries.len(), 1, "expected one directory in {}", dir.display());
    entries.remove(0)
}

/// Write an executable plotter script that only touches its output file.
#[cfg(unix)]
pub fn touch_plotter(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = write_file(dir, "plot.sh", "#!/bin/sh\ntouch \"$4\"\n");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|e| panic!("failed to chmod {}: {e}", path.display()));
    path
}

/// Write a `gnuplot` stand-in into `dir/bin` that records one argument per
/// line in `dir/gnuplot.args`. Returns the `bin` directory for `PATH`.
#[cfg(unix)]
pub fn recording_gnuplot(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let bin = dir.join("bin");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\n",
        dir.join("gnuplot.args").display()
    );
    let path = write_file(&bin, "gnuplot", &script);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .unwrap_or_else(|e| panic!("failed to chmod {}: {e}", path.display()));
    bin
}

/// Run a binary of this crate to completion.
pub fn run_bin(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("MEMREPORT_LOG_LEVEL")
        .output()
        .unwrap_or_else(|e| panic!("failed to run {bin}: {e}"))
}
