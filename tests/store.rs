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
use framebench::error::StoreError;
use framebench::frame::Shape;
use framebench::measurement::Measurement;
use framebench::memory::MemoryBreakdown;
use framebench::store::ResultStore;
use framebench::timed::TimedFrame;
use rusqlite::Connection;
use tempfile::tempdir;

fn measurement(file_size: Option<u64>) -> Measurement {
  Measurement::new(
    "to_parquet",
    TimedFrame::TYPE_NAME,
    Shape::new(4, 2),
    MemoryBreakdown::from([("Index".to_string(), 24), ("a".to_string(), 32)]),
    0.5,
    file_size,
  )
}

#[test]
fn test_negative_stored_file_size_is_reported() {
  let temp = tempdir().unwrap();
  let path = temp.path().join("results.db");
  let store = ResultStore::new(&path);
  store.save(&measurement(Some(10)), false).unwrap();

  let conn = Connection::open(&path).unwrap();
  conn.execute("UPDATE results SET file_size = -5", []).unwrap();
  drop(conn);

  assert!(matches!(store.load_all(), Err(StoreError::NegativeFileSize(-5))));
  assert!(matches!(store.find("to_parquet"), Err(StoreError::NegativeFileSize(-5))));
}

#[test]
fn test_oversized_file_size_is_rejected_on_save() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));

  let err = store.save(&measurement(Some(u64::MAX)), false).unwrap_err();
  assert!(matches!(err, StoreError::FileSizeOverflow(u64::MAX)));
  assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn test_batch_save_round_trips_with_and_without_file_size() {
  let temp = tempdir().unwrap();
  let store = ResultStore::new(temp.path().join("results.db"));

  store
    .save_batch(&[measurement(Some(2048)), measurement(None)], true)
    .unwrap();

  let stored = store.load_all().unwrap();
  assert_eq!(stored.len(), 2);
  assert!(stored.contains(&measurement(Some(2048))));
  assert!(stored.contains(&measurement(None)));
}
