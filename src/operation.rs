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

//! The closed set of operations that can be timed, and the registry mapping
//! each one to its handler.
//!
//! Operations are looked up by name (`"to_csv"`, `"read_parquet"`, ...). A
//! name is first parsed into an [`OperationName`], so a typo is reported as
//! an unsupported operation instead of failing somewhere inside a handler.

use crate::codec::delimited;
use crate::codec::excel;
use crate::codec::json;
use crate::codec::parquet_io;
use crate::codec::parquet_io::ParquetCompression;
use crate::codec::pickle;
use crate::error::ArgumentError;
use crate::error::OperationError;
use crate::frame::DType;
use crate::frame::Frame;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationName {
  ToCsv,
  ToJson,
  ToPickle,
  ToParquet,
  ToExcel,
  ReadCsv,
  ReadJson,
  ReadPickle,
  ReadParquet,
  Astype,
  SortValues,
  Head,
}

impl OperationName {
  pub const ALL: [OperationName; 12] = [
    OperationName::ToCsv,
    OperationName::ToJson,
    OperationName::ToPickle,
    OperationName::ToParquet,
    OperationName::ToExcel,
    OperationName::ReadCsv,
    OperationName::ReadJson,
    OperationName::ReadPickle,
    OperationName::ReadParquet,
    OperationName::Astype,
    OperationName::SortValues,
    OperationName::Head,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OperationName::ToCsv => "to_csv",
      OperationName::ToJson => "to_json",
      OperationName::ToPickle => "to_pickle",
      OperationName::ToParquet => "to_parquet",
      OperationName::ToExcel => "to_excel",
      OperationName::ReadCsv => "read_csv",
      OperationName::ReadJson => "read_json",
      OperationName::ReadPickle => "read_pickle",
      OperationName::ReadParquet => "read_parquet",
      OperationName::Astype => "astype",
      OperationName::SortValues => "sort_values",
      OperationName::Head => "head",
    }
  }

  /// Writers whose first positional argument is the destination file.
  pub fn is_file_writer(&self) -> bool {
    matches!(
      self,
      OperationName::ToCsv
        | OperationName::ToExcel
        | OperationName::ToJson
        | OperationName::ToPickle
        | OperationName::ToParquet
    )
  }
}

impl fmt::Display for OperationName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OperationName {
  type Err = ();

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OperationName::ALL
      .into_iter()
      .find(|name| name.as_str() == s)
      .ok_or(())
  }
}

/// A single argument passed through to a handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
  Str(String),
  Int(i64),
  Bool(bool),
  Path(PathBuf),
}

impl ArgValue {
  fn kind(&self) -> &'static str {
    match self {
      ArgValue::Str(_) => "a string",
      ArgValue::Int(_) => "an integer",
      ArgValue::Bool(_) => "a boolean",
      ArgValue::Path(_) => "a path",
    }
  }
}

impl From<&str> for ArgValue {
  fn from(value: &str) -> Self {
    ArgValue::Str(value.to_string())
  }
}

impl From<String> for ArgValue {
  fn from(value: String) -> Self {
    ArgValue::Str(value)
  }
}

impl From<i64> for ArgValue {
  fn from(value: i64) -> Self {
    ArgValue::Int(value)
  }
}

impl From<bool> for ArgValue {
  fn from(value: bool) -> Self {
    ArgValue::Bool(value)
  }
}

impl From<PathBuf> for ArgValue {
  fn from(value: PathBuf) -> Self {
    ArgValue::Path(value)
  }
}

impl From<&Path> for ArgValue {
  fn from(value: &Path) -> Self {
    ArgValue::Path(value.to_path_buf())
  }
}

/// Positional and keyword arguments forwarded verbatim to a handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationArgs {
  positional: Vec<ArgValue>,
  keyword: BTreeMap<String, ArgValue>,
}

impl OperationArgs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Shorthand for the common single-path call.
  pub fn path(path: impl AsRef<Path>) -> Self {
    Self::new().arg(path.as_ref())
  }

  pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
    self.positional.push(value.into());
    self
  }

  pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<ArgValue>) -> Self {
    self.keyword.insert(key.into(), value.into());
    self
  }

  pub fn positional(&self) -> &[ArgValue] {
    &self.positional
  }

  pub fn keywords(&self) -> impl Iterator<Item = &str> {
    self.keyword.keys().map(String::as_str)
  }

  fn positional_at(&self, index: usize, expected: &'static str) -> Result<&ArgValue, ArgumentError> {
    self
      .positional
      .get(index)
      .ok_or(ArgumentError::Missing { index, expected })
  }

  /// Positional argument `index` as a path. Strings are accepted as paths.
  pub fn path_at(&self, index: usize) -> Result<&Path, ArgumentError> {
    match self.positional_at(index, "a path")? {
      ArgValue::Path(p) => Ok(p.as_path()),
      ArgValue::Str(s) => Ok(Path::new(s)),
      _ => Err(ArgumentError::WrongType {
        position: format!("#{index}"),
        expected: "a path",
      }),
    }
  }

  pub fn str_at(&self, index: usize) -> Result<&str, ArgumentError> {
    match self.positional_at(index, "a string")? {
      ArgValue::Str(s) => Ok(s.as_str()),
      _ => Err(ArgumentError::WrongType {
        position: format!("#{index}"),
        expected: "a string",
      }),
    }
  }

  pub fn int_at(&self, index: usize) -> Result<i64, ArgumentError> {
    match self.positional_at(index, "an integer")? {
      ArgValue::Int(v) => Ok(*v),
      _ => Err(ArgumentError::WrongType {
        position: format!("#{index}"),
        expected: "an integer",
      }),
    }
  }

  pub fn keyword_str(&self, key: &str) -> Result<Option<&str>, ArgumentError> {
    match self.keyword.get(key) {
      None => Ok(None),
      Some(ArgValue::Str(s)) => Ok(Some(s.as_str())),
      Some(_) => Err(ArgumentError::WrongType {
        position: key.to_string(),
        expected: "a string",
      }),
    }
  }

  pub fn keyword_bool(&self, key: &str) -> Result<Option<bool>, ArgumentError> {
    match self.keyword.get(key) {
      None => Ok(None),
      Some(ArgValue::Bool(b)) => Ok(Some(*b)),
      Some(other) => Err(ArgumentError::WrongType {
        position: format!("{key} ({})", other.kind()),
        expected: "a boolean",
      }),
    }
  }

  /// Parses an optional string keyword with `FromStr`.
  fn keyword_parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>, ArgumentError> {
    self
      .keyword_str(key)?
      .map(|raw| {
        raw.parse().map_err(|_| ArgumentError::InvalidValue {
          position: key.to_string(),
          value: raw.to_string(),
        })
      })
      .transpose()
  }
}

/// What a transform handed back besides its side effects.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
  /// The operation only wrote a file or mutated the subject.
  None,
  /// A new frame: the loaded dataset, or the result of a pure read.
  Frame(Frame),
}

impl OperationOutput {
  pub fn into_frame(self) -> Option<Frame> {
    match self {
      OperationOutput::Frame(frame) => Some(frame),
      OperationOutput::None => None,
    }
  }
}

pub type LoaderFn = fn(&OperationArgs) -> Result<Frame, OperationError>;

pub type TransformFn = fn(&mut Frame, &OperationArgs) -> Result<OperationOutput, OperationError>;

/// A registered handler plus the keyword arguments it understands.
#[derive(Debug, Clone, Copy)]
pub struct Handler<F> {
  pub run: F,
  pub keywords: &'static [&'static str],
}

impl Handler<LoaderFn> {
  pub fn loader(run: LoaderFn, keywords: &'static [&'static str]) -> Self {
    Self { run, keywords }
  }
}

impl Handler<TransformFn> {
  pub fn transform(run: TransformFn, keywords: &'static [&'static str]) -> Self {
    Self { run, keywords }
  }
}

impl<F> Handler<F> {
  /// Rejects keywords the handler does not declare.
  pub fn check_keywords(&self, operation: OperationName, args: &OperationArgs) -> Result<(), ArgumentError> {
    match args.keywords().find(|k| !self.keywords.contains(k)) {
      Some(keyword) => Err(ArgumentError::UnexpectedKeyword {
        operation: operation.as_str(),
        keyword: keyword.to_string(),
      }),
      None => Ok(()),
    }
  }
}

/// Maps operation names to their handlers, separately for load mode and
/// transform mode.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
  loaders: HashMap<OperationName, Handler<LoaderFn>>,
  transforms: HashMap<OperationName, Handler<TransformFn>>,
}

impl OperationRegistry {
  /// A registry with nothing registered.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Every built-in reader, writer and transform.
  pub fn standard() -> Self {
    let mut registry = Self::empty();

    registry.register_transform(OperationName::ToCsv, Handler::transform(to_csv, &["delimiter"]));
    registry.register_transform(OperationName::ToJson, Handler::transform(to_json, &[]));
    registry.register_transform(OperationName::ToPickle, Handler::transform(to_pickle, &[]));
    registry.register_transform(OperationName::ToParquet, Handler::transform(to_parquet, &["compression"]));
    registry.register_transform(OperationName::ToExcel, Handler::transform(to_excel, &["sheet_name"]));
    registry.register_transform(OperationName::Astype, Handler::transform(astype, &[]));
    registry.register_transform(OperationName::SortValues, Handler::transform(sort_values, &["ascending"]));
    registry.register_transform(OperationName::Head, Handler::transform(head, &[]));

    registry.register_loader(OperationName::ReadCsv, Handler::loader(read_csv, &["delimiter"]));
    registry.register_loader(OperationName::ReadJson, Handler::loader(read_json, &[]));
    registry.register_loader(OperationName::ReadPickle, Handler::loader(read_pickle, &[]));
    registry.register_loader(OperationName::ReadParquet, Handler::loader(read_parquet, &[]));

    registry
  }

  /// Adds or replaces a load-mode handler.
  pub fn register_loader(&mut self, name: OperationName, handler: Handler<LoaderFn>) {
    self.loaders.insert(name, handler);
  }

  /// Adds or replaces a transform-mode handler.
  pub fn register_transform(&mut self, name: OperationName, handler: Handler<TransformFn>) {
    self.transforms.insert(name, handler);
  }

  pub fn loader(&self, name: OperationName) -> Option<&Handler<LoaderFn>> {
    self.loaders.get(&name)
  }

  pub fn transform(&self, name: OperationName) -> Option<&Handler<TransformFn>> {
    self.transforms.get(&name)
  }
}

fn delimiter(args: &OperationArgs) -> Result<u8, ArgumentError> {
  match args.keyword_str("delimiter")? {
    None => Ok(delimited::DEFAULT_DELIMITER),
    Some(raw) => match raw.as_bytes() {
      [byte] => Ok(*byte),
      _ => Err(ArgumentError::InvalidValue {
        position: "delimiter".to_string(),
        value: raw.to_string(),
      }),
    },
  }
}

fn to_csv(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  delimited::write_csv(frame, args.path_at(0)?, delimiter(args)?)?;
  Ok(OperationOutput::None)
}

fn to_json(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  json::write_json(frame, args.path_at(0)?)?;
  Ok(OperationOutput::None)
}

fn to_pickle(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  pickle::write_pickle(frame, args.path_at(0)?)?;
  Ok(OperationOutput::None)
}

fn to_parquet(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  let compression = args
    .keyword_parsed::<ParquetCompression>("compression")?
    .unwrap_or_default();
  parquet_io::write_parquet(frame, args.path_at(0)?, compression)?;
  Ok(OperationOutput::None)
}

fn to_excel(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  let sheet_name = args
    .keyword_str("sheet_name")?
    .unwrap_or(excel::DEFAULT_SHEET_NAME);
  excel::write_excel(frame, args.path_at(0)?, sheet_name)?;
  Ok(OperationOutput::None)
}

fn astype(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  let column = args.str_at(0)?;
  let dtype: DType = args.str_at(1)?.parse()?;
  frame.cast(column, dtype)?;
  Ok(OperationOutput::None)
}

fn sort_values(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  let ascending = args.keyword_bool("ascending")?.unwrap_or(true);
  frame.sort_by(args.str_at(0)?, ascending)?;
  Ok(OperationOutput::None)
}

fn head(frame: &mut Frame, args: &OperationArgs) -> Result<OperationOutput, OperationError> {
  let n = args.int_at(0)?;
  let n = usize::try_from(n).map_err(|_| ArgumentError::InvalidValue {
    position: "#0".to_string(),
    value: n.to_string(),
  })?;
  Ok(OperationOutput::Frame(frame.head(n)))
}

fn read_csv(args: &OperationArgs) -> Result<Frame, OperationError> {
  Ok(delimited::read_csv(args.path_at(0)?, delimiter(args)?)?)
}

fn read_json(args: &OperationArgs) -> Result<Frame, OperationError> {
  Ok(json::read_json(args.path_at(0)?)?)
}

fn read_pickle(args: &OperationArgs) -> Result<Frame, OperationError> {
  Ok(pickle::read_pickle(args.path_at(0)?)?)
}

fn read_parquet(args: &OperationArgs) -> Result<Frame, OperationError> {
  Ok(parquet_io::read_parquet(args.path_at(0)?)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_round_trip_and_unknown_names_fail() {
    for name in OperationName::ALL {
      assert_eq!(name.as_str().parse::<OperationName>(), Ok(name));
    }
    assert!("to_feather".parse::<OperationName>().is_err());
    assert!("TO_CSV".parse::<OperationName>().is_err());
  }

  #[test]
  fn only_writers_are_file_writers() {
    let writers: Vec<_> = OperationName::ALL
      .into_iter()
      .filter(OperationName::is_file_writer)
      .collect();
    assert_eq!(writers.len(), 5);
    assert!(!OperationName::ReadCsv.is_file_writer());
  }

  #[test]
  fn undeclared_keywords_are_rejected() {
    let registry = OperationRegistry::standard();
    let handler = registry.transform(OperationName::ToJson).unwrap();
    let args = OperationArgs::path("out.json").kwarg("orient", "records");
    assert!(matches!(
      handler.check_keywords(OperationName::ToJson, &args),
      Err(ArgumentError::UnexpectedKeyword { .. })
    ));
  }

  #[test]
  fn strings_are_accepted_as_paths() {
    let args = OperationArgs::new().arg("data/out.csv");
    assert_eq!(args.path_at(0).unwrap(), Path::new("data/out.csv"));
    assert!(matches!(args.int_at(0), Err(ArgumentError::WrongType { .. })));
    assert!(matches!(args.path_at(1), Err(ArgumentError::Missing { index: 1, .. })));
  }
}
