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

//! SQLite persistence for [`Measurement`]s.
//!
//! Every call opens its own connection and closes it before returning. Writes
//! run in a single transaction, so a failed save leaves the table untouched.

use crate::error::StoreError;
use crate::frame::Shape;
use crate::measurement::Measurement;
use crate::memory::MemoryBreakdown;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use std::path::Path;
use std::path::PathBuf;

const CREATE_RESULTS: &str = "
  CREATE TABLE IF NOT EXISTS results (
    method_name TEXT,
    class_name TEXT,
    shape TEXT,
    memory_usage REAL,
    memory_usage_detail TEXT,
    elapsed_time REAL,
    file_size INTEGER
  )";

const SELECT_COLUMNS: &str = "SELECT method_name, class_name, shape, memory_usage, memory_usage_detail, elapsed_time, file_size FROM results";

/// Handle to a results database on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultStore {
  path: PathBuf,
}

/// A `results` row before it is turned back into a [`Measurement`].
struct StoredRow {
  method_name: String,
  class_name: String,
  shape: String,
  memory_usage: f64,
  memory_usage_detail: String,
  elapsed_time: f64,
  file_size: Option<i64>,
}

impl StoredRow {
  fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      method_name: row.get(0)?,
      class_name: row.get(1)?,
      shape: row.get(2)?,
      memory_usage: row.get(3)?,
      memory_usage_detail: row.get(4)?,
      elapsed_time: row.get(5)?,
      file_size: row.get(6)?,
    })
  }

  fn into_measurement(self) -> Result<Measurement, StoreError> {
    let shape: Shape = self.shape.parse().map_err(StoreError::MalformedShape)?;
    let breakdown: MemoryBreakdown =
      serde_json::from_str(&self.memory_usage_detail).map_err(StoreError::MalformedBreakdown)?;

    let file_size = self
      .file_size
      .map(|size| u64::try_from(size).map_err(|_| StoreError::NegativeFileSize(size)))
      .transpose()?;

    let measurement = Measurement::new(
      self.method_name,
      self.class_name,
      shape,
      breakdown,
      self.elapsed_time,
      file_size,
    );

    if measurement.memory_bytes() as f64 != self.memory_usage {
      tracing::warn!(
        operation = measurement.operation_name(),
        stored = self.memory_usage,
        derived = measurement.memory_bytes(),
        "Stored memory usage disagrees with its breakdown; using the breakdown"
      );
    }
    Ok(measurement)
  }
}

impl ResultStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Opens the database, creating the file and the `results` table if needed.
  fn open(&self) -> Result<Connection, StoreError> {
    let conn = Connection::open(&self.path)?;
    conn.execute_batch(CREATE_RESULTS)?;
    Ok(conn)
  }

  /// Inserts one measurement, first clearing the table when `truncate` is set.
  pub fn save(&self, record: &Measurement, truncate: bool) -> Result<(), StoreError> {
    self.save_batch(std::slice::from_ref(record), truncate)
  }

  pub fn save_batch(&self, records: &[Measurement], truncate: bool) -> Result<(), StoreError> {
    let mut conn = self.open()?;
    let tx = conn.transaction()?;

    if truncate {
      let removed = tx.execute("DELETE FROM results", [])?;
      tracing::debug!(removed, path = %self.path.display(), "Truncated results table");
    }

    {
      let mut insert = tx.prepare("INSERT INTO results VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)")?;
      for record in records {
        let detail =
          serde_json::to_string(record.memory_breakdown()).map_err(StoreError::EncodeBreakdown)?;
        let file_size = record
          .file_size_bytes()
          .map(|size| i64::try_from(size).map_err(|_| StoreError::FileSizeOverflow(size)))
          .transpose()?;
        insert.execute(params![
          record.operation_name(),
          record.subject_type_name(),
          record.shape().to_string(),
          record.memory_bytes() as f64,
          detail,
          record.elapsed_seconds(),
          file_size,
        ])?;
      }
    }

    tx.commit()?;
    Ok(())
  }

  /// First stored measurement for `operation_name`, if any.
  pub fn find(&self, operation_name: &str) -> Result<Option<Measurement>, StoreError> {
    let conn = self.open()?;
    let mut stmt = conn.prepare(&format!(
      "{SELECT_COLUMNS} WHERE method_name = ?1 ORDER BY rowid LIMIT 1"
    ))?;
    let row = stmt
      .query_row([operation_name], StoredRow::from_row)
      .optional()?;
    row.map(StoredRow::into_measurement).transpose()
  }

  /// Every stored measurement. Callers should not rely on the order.
  pub fn load_all(&self) -> Result<Vec<Measurement>, StoreError> {
    let conn = self.open()?;
    let mut stmt = conn.prepare(SELECT_COLUMNS)?;
    let rows = stmt
      .query_map([], StoredRow::from_row)?
      .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(StoredRow::into_measurement).collect()
  }
}
