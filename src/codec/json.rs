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

//! JSON in the "split" orientation:
//!
//! ```json
//! {"columns": ["age", "team"], "data": [[12, "cyan"], [19, "black"]]}
//! ```
//!
//! Rows are streamed straight from the frame when writing.

use super::infer_column;
use crate::error::CodecError;
use crate::frame::Column;
use crate::frame::ColumnData;
use crate::frame::Frame;
use serde::Deserialize;
use serde::Serialize;
use serde::ser::SerializeSeq;
use serde::ser::SerializeStruct;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

struct SplitView<'a>(&'a Frame);

struct RowsView<'a>(&'a Frame);

struct RowView<'a>(&'a Frame, usize);

impl Serialize for SplitView<'_> {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut table = serializer.serialize_struct("SplitTable", 2)?;
    table.serialize_field("columns", &self.0.column_names().collect::<Vec<_>>())?;
    table.serialize_field("data", &RowsView(self.0))?;
    table.end()
  }
}

impl Serialize for RowsView<'_> {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut rows = serializer.serialize_seq(Some(self.0.num_rows()))?;
    for row in 0..self.0.num_rows() {
      rows.serialize_element(&RowView(self.0, row))?;
    }
    rows.end()
  }
}

impl Serialize for RowView<'_> {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let RowView(frame, row) = self;
    let mut cells = serializer.serialize_seq(Some(frame.num_columns()))?;
    for column in frame.columns() {
      cells.serialize_element(&column.data.cell(*row))?;
    }
    cells.end()
  }
}

#[derive(Deserialize)]
struct SplitTable {
  columns: Vec<String>,
  data: Vec<Vec<Value>>,
}

pub fn write_json(frame: &Frame, path: &Path) -> Result<(), CodecError> {
  let mut writer = BufWriter::new(File::create(path)?);
  serde_json::to_writer(&mut writer, &SplitView(frame))?;
  writer.flush()?;
  Ok(())
}

pub fn read_json(path: &Path) -> Result<Frame, CodecError> {
  let table: SplitTable = serde_json::from_reader(BufReader::new(File::open(path)?))?;
  let width = table.columns.len();

  let mut raw: Vec<Vec<Value>> = vec![Vec::with_capacity(table.data.len()); width];
  for (row, cells) in table.data.into_iter().enumerate() {
    if cells.len() != width {
      return Err(CodecError::RaggedRow {
        row,
        expected: width,
        actual: cells.len(),
      });
    }
    for (values, cell) in raw.iter_mut().zip(cells) {
      values.push(cell);
    }
  }

  let columns = table
    .columns
    .into_iter()
    .zip(raw)
    .map(|(name, values)| {
      let data = column_from_values(&name, values)?;
      Ok(Column::new(name, data))
    })
    .collect::<Result<Vec<_>, CodecError>>()?;

  Ok(Frame::new(columns)?)
}

/// Decodes one column. `null` is only accepted in numeric columns, where it
/// reads back as NaN: serde_json writes non-finite floats as `null`.
fn column_from_values(name: &str, values: Vec<Value>) -> Result<ColumnData, CodecError> {
  let mixed = || CodecError::MixedTypes {
    column: name.to_string(),
  };
  let has_nulls = values.iter().any(Value::is_null);

  match values.iter().find(|v| !v.is_null()) {
    None if values.is_empty() => Ok(ColumnData::String(Vec::new())),
    None => Ok(ColumnData::Float64(vec![f64::NAN; values.len()])),
    Some(Value::Number(_)) => {
      if !has_nulls {
        if let Some(ints) = values.iter().map(Value::as_i64).collect::<Option<Vec<_>>>() {
          return Ok(ColumnData::Int64(ints));
        }
      }
      values
        .iter()
        .map(|v| if v.is_null() { Some(f64::NAN) } else { v.as_f64() })
        .collect::<Option<Vec<_>>>()
        .map(ColumnData::Float64)
        .ok_or_else(mixed)
    }
    Some(_) if has_nulls => Err(CodecError::NullValues {
      column: name.to_string(),
    }),
    Some(Value::Bool(_)) => values
      .iter()
      .map(Value::as_bool)
      .collect::<Option<Vec<_>>>()
      .map(ColumnData::Bool)
      .ok_or_else(mixed),
    Some(Value::String(_)) => {
      let strings = values
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(mixed)?;
      Ok(infer_column(strings, false))
    }
    Some(other) => Err(CodecError::UnsupportedType {
      column: name.to_string(),
      data_type: match other {
        Value::Array(_) => "array".to_string(),
        _ => "object".to_string(),
      },
    }),
  }
}
