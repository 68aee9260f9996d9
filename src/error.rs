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
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error enum for the framebench library.
#[derive(Error, Debug)]
pub enum FrameBenchError {
  #[error("Timed operation failed")]
  Timing(#[from] TimingError),

  #[error("Frame operation failed")]
  Frame(#[from] FrameError),

  #[error("Result store error")]
  Store(#[from] StoreError),

  #[error("Configuration error")]
  Config(#[from] ConfigError),

  #[error("Failed to write report to {path}")]
  Report {
    path: PathBuf,
    #[source]
    source: ReportError,
  },

  #[error("Failed to clean {dir}")]
  Cleanup {
    dir: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Errors raised by in-memory frame construction and transforms (src/frame).
#[derive(Error, Debug)]
pub enum FrameError {
  #[error("Column '{column}' has {actual} rows, expected {expected}")]
  LengthMismatch {
    column: String,
    expected: usize,
    actual: usize,
  },

  #[error("Duplicate column name: {0}")]
  DuplicateColumn(String),

  #[error("Column name '{0}' is reserved for the index")]
  ReservedName(String),

  #[error("Column not found: {0}")]
  ColumnNotFound(String),

  #[error("Unknown dtype: {0}")]
  UnknownDType(String),

  #[error("Cannot cast column '{column}' from {from} to {to}")]
  UnsupportedCast {
    column: String,
    from: &'static str,
    to: &'static str,
  },

  #[error("Value {value} in column '{column}' does not fit in {to}")]
  Overflow {
    column: String,
    value: i64,
    to: &'static str,
  },

  #[error("Column '{column}' has more than {max} distinct categories")]
  TooManyCategories { column: String, max: usize },
}

/// Errors raised while encoding or decoding a file format (src/codec).
#[derive(Error, Debug)]
pub enum CodecError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Pickle error: {0}")]
  Pickle(#[from] bincode::Error),

  #[error("Parquet error: {0}")]
  Parquet(#[from] parquet::errors::ParquetError),

  #[error("Arrow error: {0}")]
  Arrow(#[from] arrow::error::ArrowError),

  #[error("Excel XML error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("Decoded data does not form a valid frame")]
  Frame(#[from] FrameError),

  #[error("Row {row} has {actual} fields, expected {expected}")]
  RaggedRow {
    row: usize,
    expected: usize,
    actual: usize,
  },

  #[error("Column '{column}' mixes incompatible value types")]
  MixedTypes { column: String },

  #[error("Column '{column}' contains null values")]
  NullValues { column: String },

  #[error("Column '{column}' has unsupported type {data_type}")]
  UnsupportedType { column: String, data_type: String },

  #[error("Date out of range in column '{column}': {days} days since epoch")]
  DateOutOfRange { column: String, days: i32 },
}

/// Errors raised while interpreting the arguments of an operation.
#[derive(Error, Debug)]
pub enum ArgumentError {
  #[error("Missing positional argument {index} ({expected})")]
  Missing { index: usize, expected: &'static str },

  #[error("Argument {position} should be {expected}")]
  WrongType {
    position: String,
    expected: &'static str,
  },

  #[error("Unexpected keyword argument '{keyword}' for {operation}")]
  UnexpectedKeyword {
    operation: &'static str,
    keyword: String,
  },

  #[error("Invalid value '{value}' for {position}")]
  InvalidValue { position: String, value: String },
}

/// Anything a registered operation handler can fail with.
#[derive(Error, Debug)]
pub enum OperationError {
  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error(transparent)]
  Frame(#[from] FrameError),

  #[error(transparent)]
  Argument(#[from] ArgumentError),
}

/// Errors related to timing an operation (src/timed.rs).
#[derive(Error, Debug)]
pub enum TimingError {
  #[error("Unsupported operation '{name}' in {mode} mode")]
  UnsupportedOperation { name: String, mode: &'static str },

  #[error("Invalid arguments for {operation}")]
  Arguments {
    operation: &'static str,
    #[source]
    source: ArgumentError,
  },

  #[error("Failed to stat {path}")]
  FileSize {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Operation {operation} failed: {source}")]
  Operation {
    operation: &'static str,
    #[source]
    source: OperationError,
  },

  #[error("Failed to persist measurement")]
  Store(#[from] StoreError),
}

/// Errors related to the SQLite result store (src/store.rs).
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("SQLite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("Malformed shape literal: {0}")]
  MalformedShape(String),

  #[error("Malformed memory breakdown")]
  MalformedBreakdown(#[source] serde_json::Error),

  #[error("Failed to encode memory breakdown")]
  EncodeBreakdown(#[source] serde_json::Error),

  #[error("Stored file size {0} is negative")]
  NegativeFileSize(i64),

  #[error("File size {0} does not fit in an SQLite integer")]
  FileSizeOverflow(u64),
}

/// Errors related to configuration resolution (src/config.rs).
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Config file not found: {0}")]
  FileNotFound(PathBuf),

  #[error("Unsupported config file extension: {0}")]
  UnsupportedFile(PathBuf),

  #[error("Failed to read configuration: {0}")]
  Extract(#[from] Box<figment::Error>),

  #[error("Failed to resolve working directory")]
  WorkingDir(#[source] std::io::Error),

  #[error("No dataset sizes configured")]
  NoSizes,

  #[error("No file formats configured")]
  NoFormats,
}

/// Errors related to writing the results table and Markdown report.
#[derive(Error, Debug)]
pub enum ReportError {
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("CSV error: {0}")]
  Csv(#[from] csv::Error),
}
