// Copyright 2025 Chisomo Makombo Sakala
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use assert_cmd::cargo;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

use serde_json::Value;

fn fbench() -> Command {
  let mut cmd = Command::new(cargo::cargo_bin!("fbench"));
  cmd
    .env("NO_COLOR", "1")
    .env_remove("FRAMEBENCH_LOG_FILE")
    .env_remove("FRAMEBENCH_CONFIG")
    .env_remove("RUST_LOG");
  cmd
}

fn run_small(data_dir: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
  fbench()
    .arg("run")
    .arg("--data-dir")
    .arg(data_dir)
    .arg("--sizes")
    .arg("20,50")
    .arg("--seed")
    .arg("42")
    .args(extra)
    .assert()
}

#[test]
fn test_run_writes_database_and_reports() {
  let temp = tempdir().unwrap();
  let data_dir = temp.path().join("data");

  run_small(&data_dir, &[])
    .success()
    .stderr(predicate::str::contains("Benchmark Run Complete"));

  assert!(data_dir.join("benchmarks.db").exists());
  assert!(data_dir.join("report.md").exists());

  // Two sizes, two variants, four formats, one write and one read each.
  let results = fs::read_to_string(data_dir.join("results.csv")).unwrap();
  assert!(results.starts_with("method_name,file_format,dataframe_size"));
  assert_eq!(results.lines().count(), 1 + 2 * 2 * 4 * 2);

  // Dataset files are swept once the run finishes.
  assert!(!data_dir.join("dataset_20.csv").exists());
  assert!(!data_dir.join("dataset_50.parquet").exists());

  let report = fs::read_to_string(data_dir.join("report.md")).unwrap();
  assert!(report.contains("read_parquet"));
  assert!(report.contains("## Correlation"));
}

#[test]
fn test_run_keep_artifacts_and_no_report() {
  let temp = tempdir().unwrap();

  run_small(
    temp.path(),
    &["--formats", "csv,excel", "--keep-artifacts", "--no-report", "--no-store"],
  )
  .success()
  .stderr(predicate::str::contains("No reader for format"));

  assert!(temp.path().join("dataset_20.csv").exists());
  assert!(temp.path().join("dataset_50.xml").exists());
  assert!(!temp.path().join("results.csv").exists());
  assert!(!temp.path().join("benchmarks.db").exists());
}

#[test]
fn test_run_rejects_missing_config_file() {
  let temp = tempdir().unwrap();

  fbench()
    .arg("run")
    .arg("--config")
    .arg(temp.path().join("missing.toml"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_run_reads_toml_config() {
  let temp = tempdir().unwrap();
  let config_path = temp.path().join("bench.toml");
  let data_dir = temp.path().join("out");
  fs::write(
    &config_path,
    format!(
      "data_dir = {:?}\nsizes = [10]\nformats = [\"json\"]\ndataset = \"scores\"\nseed = 7\ncleanup = false\n",
      data_dir.display().to_string()
    ),
  )
  .unwrap();

  fbench()
    .arg("run")
    .arg("--config")
    .arg(&config_path)
    .assert()
    .success();

  assert!(data_dir.join("dataset_10.json").exists());
  let results = fs::read_to_string(data_dir.join("results.csv")).unwrap();
  assert_eq!(results.lines().count(), 1 + 2 * 2);
}

#[test]
fn test_show_prints_stored_measurements() {
  let temp = tempdir().unwrap();
  run_small(temp.path(), &["--formats", "csv"]).success();
  let database = temp.path().join("benchmarks.db");

  fbench()
    .arg("show")
    .arg("--database")
    .arg(&database)
    .arg("--method")
    .arg("to_csv")
    .assert()
    .success()
    .stdout(predicate::str::contains("Method: to_csv"))
    .stdout(predicate::str::contains("Class: TimedFrame"))
    .stdout(predicate::str::contains("Shape: (20, 6)"));

  let output = fbench()
    .arg("show")
    .arg("--database")
    .arg(&database)
    .arg("--json")
    .output()
    .unwrap();
  assert!(output.status.success());
  let records: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(records.as_array().unwrap().len(), 2 * 2 * 2);
}

#[test]
fn test_show_missing_database_fails() {
  let temp = tempdir().unwrap();

  fbench()
    .arg("show")
    .arg("--database")
    .arg(temp.path().join("nope.db"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("Result database not found"));

  assert!(!temp.path().join("nope.db").exists());
}

#[test]
fn test_clean_removes_matching_extensions() {
  let temp = tempdir().unwrap();
  for name in ["a.csv", "b.parquet", "keep.txt"] {
    fs::write(temp.path().join(name), "x").unwrap();
  }

  fbench()
    .arg("clean")
    .arg("--dir")
    .arg(temp.path())
    .arg("csv")
    .arg(".parquet")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2 file(s)"));

  assert!(temp.path().join("keep.txt").exists());
  assert!(!temp.path().join("a.csv").exists());
}

#[test]
fn test_clean_all_empties_directory() {
  let temp = tempdir().unwrap();
  fs::write(temp.path().join("one.json"), "{}").unwrap();
  fs::write(temp.path().join("two.db"), "").unwrap();

  fbench()
    .arg("clean")
    .arg("--dir")
    .arg(temp.path())
    .arg("--all")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2 file(s)"));

  assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}
