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
use crate::cleanup::cleanup;
use crate::codec::FileFormat;
use crate::config::Config;
use crate::error::FrameBenchError;
use crate::frame::Frame;
use crate::measurement::Measurement;
use crate::memory::memory_breakdown;
use crate::memory::percentage_difference;
use crate::operation::OperationArgs;
use crate::store::ResultStore;
use crate::timed::TimeOptions;
use crate::timed::TimedFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1_000_000.0;

/// One timed write or read, flattened for the results table and report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
  pub method_name: String,
  pub file_format: FileFormat,
  pub dataframe_size: usize,
  pub is_datatype_optimized: bool,
  pub time_seconds: f64,
  pub memory_usage_mb: f64,
  pub file_size_mb: Option<f64>,
}

impl BenchmarkRow {
  pub fn from_measurement(
    measurement: &Measurement,
    file_format: FileFormat,
    dataframe_size: usize,
    is_datatype_optimized: bool,
  ) -> Self {
    Self {
      method_name: measurement.operation_name().to_string(),
      file_format,
      dataframe_size,
      is_datatype_optimized,
      time_seconds: measurement.elapsed_seconds(),
      memory_usage_mb: measurement.memory_bytes() as f64 / BYTES_PER_MB,
      file_size_mb: measurement
        .file_size_bytes()
        .map(|bytes| bytes as f64 / BYTES_PER_MB),
    }
  }
}

/// Path of the artifact written for one dataset size and format.
pub fn dataset_path(data_dir: &Path, size: usize, format: FileFormat) -> PathBuf {
  data_dir.join(format!("dataset_{}.{}", size, format.extension()))
}

/// Main benchmark runner.
///
/// For every configured size, generates the raw dataset and its optimized
/// copy, then times each format's writer followed by its reader on both.
pub fn run_benchmarks(config: &Config) -> Result<Vec<BenchmarkRow>, FrameBenchError> {
  let span = tracing::info_span!(
    "run_benchmarks",
    dataset = ?config.dataset,
    seed = config.seed
  );
  let _enter = span.enter();

  tracing::info!("--- Starting Benchmark Pipeline ---");
  fs::create_dir_all(&config.data_dir)?;

  let store = config.database.as_ref().map(ResultStore::new);
  if let Some(store) = &store {
    if config.fresh_store {
      reset_store(config, store)?;
    }
    tracing::info!(path = %store.path().display(), "Persisting measurements");
  }

  let mut rng = StdRng::seed_from_u64(config.seed);
  let mut rows = Vec::new();

  for &size in &config.sizes {
    let size_span = tracing::info_span!("run_size", size);
    let _size_enter = size_span.enter();

    tracing::info!("Generating {} rows...", size);
    let raw = config.dataset.generate(size, &mut rng)?;
    let optimized = config.dataset.optimize(raw.clone())?;
    log_memory_savings(&raw, &optimized);

    for (is_optimized, frame) in [(false, raw), (true, optimized)] {
      let variant_span = tracing::info_span!("run_variant", optimized = is_optimized);
      let _variant_enter = variant_span.enter();

      rows.extend(run_formats(config, store.as_ref(), size, is_optimized, frame)?);
    }
  }

  tracing::info!(observations = rows.len(), "--- Benchmark run complete ---");
  Ok(rows)
}

fn run_formats(
  config: &Config,
  store: Option<&ResultStore>,
  size: usize,
  is_optimized: bool,
  frame: Frame,
) -> Result<Vec<BenchmarkRow>, FrameBenchError> {
  let mut timed_frame = TimedFrame::new(frame);
  let mut rows = Vec::new();

  let options = |read: bool| {
    let options = if read { TimeOptions::read() } else { TimeOptions::transform() };
    match store {
      Some(store) => options.persist_to(store.clone()),
      None => options,
    }
  };

  for &format in &config.formats {
    let path = dataset_path(&config.data_dir, size, format);

    let (_, written) = timed_frame.time(
      format.writer_name(),
      OperationArgs::path(&path),
      options(false),
    )?;
    tracing::info!(
      format = %format,
      "{} took {:.5} seconds",
      written.operation_name(),
      written.elapsed_seconds()
    );
    rows.push(BenchmarkRow::from_measurement(&written, format, size, is_optimized));

    let Some(reader) = format.reader_name() else {
      tracing::warn!(format = %format, "No reader for format. Skipping read benchmark.");
      continue;
    };

    let (_, read) = timed_frame.time(reader, OperationArgs::path(&path), options(true))?;
    tracing::info!(
      format = %format,
      "{} took {:.5} seconds",
      read.operation_name(),
      read.elapsed_seconds()
    );
    rows.push(BenchmarkRow::from_measurement(&read, format, size, is_optimized));
  }

  Ok(rows)
}

/// Deletes old databases in the data directory, and empties the configured
/// one if it lives elsewhere.
fn reset_store(config: &Config, store: &ResultStore) -> Result<(), FrameBenchError> {
  let removed = cleanup(&config.data_dir, &["db".to_string()], false)?;
  if removed > 0 {
    tracing::info!(removed, "Removed previous result databases");
  }
  if store.path().exists() {
    store.save_batch(&[], true)?;
  }
  Ok(())
}

fn log_memory_savings(raw: &Frame, optimized: &Frame) {
  let before = memory_breakdown(raw);
  let after = memory_breakdown(optimized);
  for (column, change) in percentage_difference(&before, &after) {
    tracing::info!(column = %column, "Memory change after optimization: {:.2}%", change);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::BTreeMap;

  #[test]
  fn row_converts_bytes_to_megabytes() {
    let breakdown = BTreeMap::from([("Index".to_string(), 500_000_u64), ("a".to_string(), 1_500_000)]);
    let measurement = Measurement::new(
      "to_csv",
      TimedFrame::TYPE_NAME,
      (10, 1).into(),
      breakdown,
      0.25,
      Some(2_500_000),
    );

    let row = BenchmarkRow::from_measurement(&measurement, FileFormat::Csv, 10, true);
    assert_eq!(row.method_name, "to_csv");
    assert_eq!(row.memory_usage_mb, 2.0);
    assert_eq!(row.file_size_mb, Some(2.5));
    assert!(row.is_datatype_optimized);
  }

  #[test]
  fn dataset_paths_use_format_extension() {
    let path = dataset_path(Path::new("data"), 1000, FileFormat::Parquet);
    assert_eq!(path, Path::new("data").join("dataset_1000.parquet"));
  }
}
