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
use super::infer_column;
use crate::error::CodecError;
use crate::frame::Column;
use crate::frame::Frame;
use csv::ReaderBuilder;
use csv::WriterBuilder;
use std::path::Path;

pub const DEFAULT_DELIMITER: u8 = b',';

/// Writes a header row plus one record per row. The index is not written.
/// A frame without columns produces an empty file.
pub fn write_csv(frame: &Frame, path: &Path, delimiter: u8) -> Result<(), CodecError> {
  let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
  if frame.num_columns() == 0 {
    writer.flush()?;
    return Ok(());
  }
  writer.write_record(frame.column_names())?;

  let mut record: Vec<String> = Vec::with_capacity(frame.num_columns());
  for row in 0..frame.num_rows() {
    record.clear();
    record.extend(frame.columns().iter().map(|c| c.data.cell(row).to_string()));
    writer.write_record(&record)?;
  }

  writer.flush()?;
  Ok(())
}

/// Reads a CSV file with a header row, inferring each column's type.
pub fn read_csv(path: &Path, delimiter: u8) -> Result<Frame, CodecError> {
  let mut reader = ReaderBuilder::new().delimiter(delimiter).from_path(path)?;
  let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

  let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
  for record in reader.records() {
    let record = record?;
    for (values, field) in raw.iter_mut().zip(record.iter()) {
      values.push(field.to_string());
    }
  }

  let columns = headers
    .into_iter()
    .zip(raw)
    .map(|(name, values)| Column::new(name, infer_column(values, true)))
    .collect();

  Ok(Frame::new(columns)?)
}
