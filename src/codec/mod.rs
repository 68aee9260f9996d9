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

//! File encodings a [`Frame`](crate::frame::Frame) can be written to and read
//! back from.
//!
//! Text formats (CSV, JSON) lose column types on the way out, so their readers
//! infer them again. The binary formats (pickle, Parquet) keep them.

pub mod delimited;
pub mod excel;
pub mod json;
pub mod parquet_io;
pub mod pickle;

use crate::frame::ColumnData;
use crate::frame::DATE_FORMAT;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A benchmarked file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
  Csv,
  Json,
  Pickle,
  Parquet,
  Excel,
}

impl FileFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      FileFormat::Csv => "csv",
      FileFormat::Json => "json",
      FileFormat::Pickle => "pickle",
      FileFormat::Parquet => "parquet",
      FileFormat::Excel => "excel",
    }
  }

  /// File extension used for benchmark artifacts.
  pub fn extension(&self) -> &'static str {
    match self {
      FileFormat::Excel => "xml",
      other => other.as_str(),
    }
  }

  /// Name of the operation that writes this format.
  pub fn writer_name(&self) -> &'static str {
    match self {
      FileFormat::Csv => "to_csv",
      FileFormat::Json => "to_json",
      FileFormat::Pickle => "to_pickle",
      FileFormat::Parquet => "to_parquet",
      FileFormat::Excel => "to_excel",
    }
  }

  /// Name of the loader for this format. Excel workbooks are write-only.
  pub fn reader_name(&self) -> Option<&'static str> {
    match self {
      FileFormat::Csv => Some("read_csv"),
      FileFormat::Json => Some("read_json"),
      FileFormat::Pickle => Some("read_pickle"),
      FileFormat::Parquet => Some("read_parquet"),
      FileFormat::Excel => None,
    }
  }
}

impl fmt::Display for FileFormat {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FileFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "csv" => Ok(FileFormat::Csv),
      "json" => Ok(FileFormat::Json),
      "pickle" | "pkl" => Ok(FileFormat::Pickle),
      "parquet" => Ok(FileFormat::Parquet),
      "excel" | "xml" => Ok(FileFormat::Excel),
      _ => Err(format!("unknown file format: {s}")),
    }
  }
}

fn parse_bool(value: &str) -> Option<bool> {
  match value {
    "true" | "True" | "TRUE" => Some(true),
    "false" | "False" | "FALSE" => Some(false),
    _ => None,
  }
}

fn parse_all<T>(values: &[String], parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
  values.iter().map(|v| parse(v)).collect()
}

/// Picks the narrowest column type every value parses as: `int64`, then
/// `float64`, `bool`, `date`, falling back to `string`. With `numeric` off
/// only dates are recognised.
pub(crate) fn infer_column(values: Vec<String>, numeric: bool) -> ColumnData {
  if values.is_empty() {
    return ColumnData::String(values);
  }
  if numeric {
    if let Some(ints) = parse_all(&values, |v| v.parse::<i64>().ok()) {
      return ColumnData::Int64(ints);
    }
    if let Some(floats) = parse_all(&values, |v| v.parse::<f64>().ok()) {
      return ColumnData::Float64(floats);
    }
    if let Some(flags) = parse_all(&values, parse_bool) {
      return ColumnData::Bool(flags);
    }
  }
  if let Some(dates) = parse_all(&values, |v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok()) {
    return ColumnData::Date(dates);
  }
  ColumnData::String(values)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn infers_narrowest_type() {
    assert_eq!(infer_column(strings(&["1", "-2"]), true), ColumnData::Int64(vec![1, -2]));
    assert_eq!(infer_column(strings(&["1", "2.5"]), true), ColumnData::Float64(vec![1.0, 2.5]));
    assert_eq!(
      infer_column(strings(&["True", "false"]), true),
      ColumnData::Bool(vec![true, false])
    );
    assert!(matches!(
      infer_column(strings(&["2015-01-01", "2020-12-31"]), true),
      ColumnData::Date(_)
    ));
    assert!(matches!(infer_column(strings(&["win", "1"]), true), ColumnData::String(_)));
  }

  #[test]
  fn non_numeric_mode_keeps_digit_strings() {
    assert!(matches!(infer_column(strings(&["1", "2"]), false), ColumnData::String(_)));
  }
}
