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
use framebench::dataset::generate_team_results;
use framebench::error::OperationError;
use framebench::error::TimingError;
use framebench::frame::Column;
use framebench::frame::ColumnData;
use framebench::frame::Frame;
use framebench::frame::Shape;
use framebench::memory::memory_breakdown;
use framebench::operation::OperationArgs;
use framebench::operation::OperationOutput;
use framebench::store::ResultStore;
use framebench::timed::TimeOptions;
use framebench::timed::TimedFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use tempfile::tempdir;

fn team_results(rows: usize) -> Frame {
  generate_team_results(rows, &mut StdRng::seed_from_u64(42)).unwrap()
}

#[test]
fn test_csv_round_trip_measures_both_directions() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("dataset_100.csv");
  let mut timed = TimedFrame::new(team_results(100));

  let (output, written) = timed
    .time("to_csv", OperationArgs::path(&path), TimeOptions::transform())
    .unwrap();
  assert_eq!(output, OperationOutput::None);
  assert_eq!(written.operation_name(), "to_csv");
  assert_eq!(written.subject_type_name(), TimedFrame::TYPE_NAME);
  assert_eq!(written.shape(), Shape::new(100, 6));
  assert_eq!(written.file_size_bytes(), Some(fs::metadata(&path).unwrap().len()));
  assert!(written.elapsed_seconds() > 0.0);

  let (output, read) = timed
    .time("read_csv", OperationArgs::path(&path), TimeOptions::read())
    .unwrap();
  let loaded = output.into_frame().unwrap();
  assert_eq!(loaded.shape(), Shape::new(100, 6));
  assert_eq!(read.shape(), Shape::new(100, 6));
  assert_eq!(read.file_size_bytes(), written.file_size_bytes());
  assert_eq!(read.memory_breakdown(), &memory_breakdown(&loaded));
}

#[test]
fn test_memory_total_matches_breakdown() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("frame.pickle");
  let mut timed = TimedFrame::new(team_results(30));

  let (_, measurement) = timed
    .time("to_pickle", OperationArgs::path(&path), TimeOptions::transform())
    .unwrap();

  let total: u64 = measurement.memory_breakdown().values().sum();
  assert_eq!(measurement.memory_bytes(), total);
  assert!(measurement.memory_breakdown().contains_key("Index"));
  assert!(measurement.elapsed_seconds() >= 0.0);
}

#[test]
fn test_load_file_size_taken_before_read() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("data.json");
  let mut timed = TimedFrame::new(team_results(10));
  timed
    .time("to_json", OperationArgs::path(&path), TimeOptions::transform())
    .unwrap();
  let size = fs::metadata(&path).unwrap().len();

  let (_, measurement) = TimedFrame::new(Frame::default())
    .time("read_json", OperationArgs::path(&path), TimeOptions::read())
    .unwrap();
  assert_eq!(measurement.file_size_bytes(), Some(size));
}

#[test]
fn test_transform_describes_subject_not_result() {
  let mut timed = TimedFrame::new(team_results(40));

  let (output, measurement) = timed
    .time("head", OperationArgs::new().arg(5_i64), TimeOptions::transform())
    .unwrap();

  assert_eq!(output.into_frame().unwrap().num_rows(), 5);
  assert_eq!(measurement.shape(), Shape::new(40, 6));
  assert_eq!(measurement.file_size_bytes(), None);
}

#[test]
fn test_astype_mutates_wrapped_frame() {
  let mut timed = TimedFrame::new(team_results(20));

  timed
    .time(
      "astype",
      OperationArgs::new().arg("team").arg("category"),
      TimeOptions::transform(),
    )
    .unwrap();

  let team = timed.frame().column("team").unwrap();
  assert!(matches!(team.data, ColumnData::Category(_)));
}

#[test]
fn test_unknown_operation_is_rejected() {
  let mut timed = TimedFrame::new(team_results(5));

  let err = timed
    .time("to_feather", OperationArgs::new(), TimeOptions::transform())
    .unwrap_err();
  assert!(matches!(err, TimingError::UnsupportedOperation { .. }));

  // A writer is not a loader.
  let err = timed
    .time("to_csv", OperationArgs::path("x.csv"), TimeOptions::read())
    .unwrap_err();
  assert!(matches!(err, TimingError::UnsupportedOperation { mode: "load", .. }));
}

#[test]
fn test_unexpected_keyword_is_rejected() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("out.json");
  let mut timed = TimedFrame::new(team_results(5));

  let err = timed
    .time(
      "to_json",
      OperationArgs::path(&path).kwarg("orient", "records"),
      TimeOptions::transform(),
    )
    .unwrap_err();
  assert!(matches!(err, TimingError::Arguments { .. }));
  assert!(!path.exists());
}

#[test]
fn test_missing_file_on_load_fails_without_record() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));

  let err = TimedFrame::new(Frame::default())
    .time(
      "read_csv",
      OperationArgs::path(temp.path().join("missing.csv")),
      TimeOptions::read().persist_to(store.clone()),
    )
    .unwrap_err();

  assert!(matches!(err, TimingError::FileSize { .. }));
  assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_failing_operation_propagates_and_skips_store() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));
  let mut timed = TimedFrame::new(team_results(5));

  let err = timed
    .time(
      "to_csv",
      OperationArgs::path(temp.path().join("no_such_dir").join("out.csv")),
      TimeOptions::transform().persist_to(store.clone()),
    )
    .unwrap_err();

  assert!(matches!(
    err,
    TimingError::Operation {
      operation: "to_csv",
      source: OperationError::Codec(_)
    }
  ));
  assert!(store.find("to_csv").unwrap().is_none());
}

#[test]
fn test_persisted_measurement_round_trips() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));
  let path = temp.path().join("out.parquet");
  let mut timed = TimedFrame::new(team_results(25));

  let (_, measurement) = timed
    .time(
      "to_parquet",
      OperationArgs::path(&path).kwarg("compression", "zstd"),
      TimeOptions::transform().persist_to(store.clone()),
    )
    .unwrap();

  let stored = store.find("to_parquet").unwrap().unwrap();
  assert_eq!(stored, measurement);
  assert!(store.find("read_parquet").unwrap().is_none());
}

#[test]
fn test_truncate_keeps_only_latest_record() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));
  let frame = Frame::new(vec![Column::new("n", ColumnData::Int64((0..10).collect()))]).unwrap();
  let mut timed = TimedFrame::new(frame);

  for n in 1..=3_i64 {
    timed
      .time(
        "head",
        OperationArgs::new().arg(n),
        TimeOptions::transform().persist_to(store.clone()).truncate(true),
      )
      .unwrap();
  }
  timed
    .time(
      "sort_values",
      OperationArgs::new().arg("n").kwarg("ascending", false),
      TimeOptions::transform().persist_to(store.clone()).truncate(true),
    )
    .unwrap();

  let all = store.load_all().unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].operation_name(), "sort_values");
}

#[test]
fn test_find_on_fresh_store_is_none() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("fresh.db"));

  assert!(store.find("to_csv").unwrap().is_none());
  assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_loader_error_on_existing_file_skips_store() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));

  for (name, file, content) in [
    ("read_parquet", "broken.parquet", "not a parquet file"),
    ("read_json", "broken.json", "{\"columns\": [\"a\"], \"data\": [[1, 2]]}"),
  ] {
    let path = temp.path().join(file);
    fs::write(&path, content).unwrap();

    let err = TimedFrame::new(Frame::default())
      .time(name, OperationArgs::path(&path), TimeOptions::read().persist_to(store.clone()))
      .unwrap_err();

    assert!(
      matches!(
        &err,
        TimingError::Operation {
          operation,
          source: OperationError::Codec(_)
        } if *operation == name
      ),
      "unexpected error for {name}: {err:?}"
    );
  }

  assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_json_round_trip_keeps_non_finite_floats() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("floats.json");
  let frame = Frame::new(vec![Column::new(
    "x",
    ColumnData::Float64(vec![1.5, f64::NAN, f64::INFINITY]),
  )])
  .unwrap();
  let mut timed = TimedFrame::new(frame);

  timed
    .time("to_json", OperationArgs::path(&path), TimeOptions::transform())
    .unwrap();
  let (output, measurement) = timed
    .time("read_json", OperationArgs::path(&path), TimeOptions::read())
    .unwrap();

  assert_eq!(measurement.shape(), Shape::new(3, 1));
  let loaded = output.into_frame().unwrap();
  let ColumnData::Float64(values) = &loaded.column("x").unwrap().data else {
    panic!("x should read back as float64");
  };
  assert_eq!(values[0], 1.5);
  assert!(values[1].is_nan());
  assert!(values[2].is_nan());
}
