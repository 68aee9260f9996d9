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

//! In-memory columnar table used as the subject of every timed operation.
//!
//! A [`Frame`] is an ordered list of uniquely named [`Column`]s of equal
//! length. Rows are addressed by an implicit range index, which is why the
//! name `Index` is reserved.

use crate::error::FrameError;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Name of the index pseudo-column in memory breakdowns.
pub const INDEX_COLUMN: &str = "Index";

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
  Bool,
  Int8,
  Int64,
  Float32,
  Float64,
  String,
  Category,
  Date,
}

impl DType {
  pub fn as_str(&self) -> &'static str {
    match self {
      DType::Bool => "bool",
      DType::Int8 => "int8",
      DType::Int64 => "int64",
      DType::Float32 => "float32",
      DType::Float64 => "float64",
      DType::String => "string",
      DType::Category => "category",
      DType::Date => "date",
    }
  }
}

impl fmt::Display for DType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DType {
  type Err = FrameError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "bool" | "boolean" => Ok(DType::Bool),
      "int8" => Ok(DType::Int8),
      "int64" | "int" => Ok(DType::Int64),
      "float32" => Ok(DType::Float32),
      "float64" | "float" => Ok(DType::Float64),
      "string" | "str" | "object" => Ok(DType::String),
      "category" => Ok(DType::Category),
      "date" | "datetime64" => Ok(DType::Date),
      _ => Err(FrameError::UnknownDType(s.to_string())),
    }
  }
}

/// Dictionary-encoded strings. Categories are kept sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CategoricalParts")]
pub struct Categorical {
  categories: Vec<String>,
  codes: Vec<u16>,
}

#[derive(Deserialize)]
struct CategoricalParts {
  categories: Vec<String>,
  codes: Vec<u16>,
}

impl TryFrom<CategoricalParts> for Categorical {
  type Error = String;

  fn try_from(CategoricalParts { categories, codes }: CategoricalParts) -> Result<Self, Self::Error> {
    match codes.iter().find(|c| **c as usize >= categories.len()) {
      Some(code) => Err(format!(
        "category code {code} out of range for {} categories",
        categories.len()
      )),
      None => Ok(Self { categories, codes }),
    }
  }
}

impl Categorical {
  pub const MAX_CATEGORIES: usize = u16::MAX as usize + 1;

  /// Builds a categorical column from raw values. `column` is only used for
  /// error reporting.
  pub fn from_values<S: AsRef<str>>(column: &str, values: &[S]) -> Result<Self, FrameError> {
    let distinct: BTreeSet<&str> = values.iter().map(AsRef::as_ref).collect();
    if distinct.len() > Self::MAX_CATEGORIES {
      return Err(FrameError::TooManyCategories {
        column: column.to_string(),
        max: Self::MAX_CATEGORIES,
      });
    }

    let lookup: HashMap<&str, u16> = distinct
      .iter()
      .enumerate()
      .map(|(code, value)| (*value, code as u16))
      .collect();
    let codes = values.iter().map(|v| lookup[v.as_ref()]).collect();
    let categories = distinct.into_iter().map(str::to_string).collect();

    Ok(Self { categories, codes })
  }

  pub fn categories(&self) -> &[String] {
    &self.categories
  }

  pub fn codes(&self) -> &[u16] {
    &self.codes
  }

  pub fn len(&self) -> usize {
    self.codes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.codes.is_empty()
  }

  pub fn get(&self, row: usize) -> &str {
    &self.categories[self.codes[row] as usize]
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
    self.codes.iter().map(|c| self.categories[*c as usize].as_str())
  }

  fn take(&self, rows: &[usize]) -> Self {
    Self {
      categories: self.categories.clone(),
      codes: rows.iter().map(|r| self.codes[*r]).collect(),
    }
  }
}

/// Typed storage for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
  Bool(Vec<bool>),
  Int8(Vec<i8>),
  Int64(Vec<i64>),
  Float32(Vec<f32>),
  Float64(Vec<f64>),
  String(Vec<String>),
  Category(Categorical),
  Date(Vec<NaiveDate>),
}

/// A borrowed view of one value, used by the text-based codecs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
  Bool(bool),
  Int(i64),
  Float32(f32),
  Float64(f64),
  Str(&'a str),
  Date(NaiveDate),
}

/// Textual date layout shared by every codec.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

impl fmt::Display for Cell<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cell::Bool(v) => write!(f, "{v}"),
      Cell::Int(v) => write!(f, "{v}"),
      Cell::Float32(v) => write!(f, "{v}"),
      Cell::Float64(v) => write!(f, "{v}"),
      Cell::Str(v) => f.write_str(v),
      Cell::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
    }
  }
}

impl Serialize for Cell<'_> {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Cell::Bool(v) => serializer.serialize_bool(*v),
      Cell::Int(v) => serializer.serialize_i64(*v),
      Cell::Float32(v) => serializer.serialize_f32(*v),
      Cell::Float64(v) => serializer.serialize_f64(*v),
      Cell::Str(v) => serializer.serialize_str(v),
      Cell::Date(v) => serializer.collect_str(&v.format(DATE_FORMAT)),
    }
  }
}

impl ColumnData {
  pub fn len(&self) -> usize {
    match self {
      ColumnData::Bool(v) => v.len(),
      ColumnData::Int8(v) => v.len(),
      ColumnData::Int64(v) => v.len(),
      ColumnData::Float32(v) => v.len(),
      ColumnData::Float64(v) => v.len(),
      ColumnData::String(v) => v.len(),
      ColumnData::Category(v) => v.len(),
      ColumnData::Date(v) => v.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn dtype(&self) -> DType {
    match self {
      ColumnData::Bool(_) => DType::Bool,
      ColumnData::Int8(_) => DType::Int8,
      ColumnData::Int64(_) => DType::Int64,
      ColumnData::Float32(_) => DType::Float32,
      ColumnData::Float64(_) => DType::Float64,
      ColumnData::String(_) => DType::String,
      ColumnData::Category(_) => DType::Category,
      ColumnData::Date(_) => DType::Date,
    }
  }

  pub fn cell(&self, row: usize) -> Cell<'_> {
    match self {
      ColumnData::Bool(v) => Cell::Bool(v[row]),
      ColumnData::Int8(v) => Cell::Int(i64::from(v[row])),
      ColumnData::Int64(v) => Cell::Int(v[row]),
      ColumnData::Float32(v) => Cell::Float32(v[row]),
      ColumnData::Float64(v) => Cell::Float64(v[row]),
      ColumnData::String(v) => Cell::Str(&v[row]),
      ColumnData::Category(v) => Cell::Str(v.get(row)),
      ColumnData::Date(v) => Cell::Date(v[row]),
    }
  }

  /// Gathers the given rows, in order, into a new column.
  pub fn take(&self, rows: &[usize]) -> ColumnData {
    fn gather<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
      rows.iter().map(|r| values[*r].clone()).collect()
    }

    match self {
      ColumnData::Bool(v) => ColumnData::Bool(gather(v, rows)),
      ColumnData::Int8(v) => ColumnData::Int8(gather(v, rows)),
      ColumnData::Int64(v) => ColumnData::Int64(gather(v, rows)),
      ColumnData::Float32(v) => ColumnData::Float32(gather(v, rows)),
      ColumnData::Float64(v) => ColumnData::Float64(gather(v, rows)),
      ColumnData::String(v) => ColumnData::String(gather(v, rows)),
      ColumnData::Category(v) => ColumnData::Category(v.take(rows)),
      ColumnData::Date(v) => ColumnData::Date(gather(v, rows)),
    }
  }

  fn compare_rows(&self, a: usize, b: usize) -> Ordering {
    match self {
      ColumnData::Bool(v) => v[a].cmp(&v[b]),
      ColumnData::Int8(v) => v[a].cmp(&v[b]),
      ColumnData::Int64(v) => v[a].cmp(&v[b]),
      ColumnData::Float32(v) => v[a].total_cmp(&v[b]),
      ColumnData::Float64(v) => v[a].total_cmp(&v[b]),
      ColumnData::String(v) => v[a].cmp(&v[b]),
      ColumnData::Category(v) => v.codes[a].cmp(&v.codes[b]),
      ColumnData::Date(v) => v[a].cmp(&v[b]),
    }
  }

  fn cast(&self, column: &str, to: DType) -> Result<ColumnData, FrameError> {
    let from = self.dtype();
    if from == to {
      return Ok(self.clone());
    }

    let unsupported = || FrameError::UnsupportedCast {
      column: column.to_string(),
      from: from.as_str(),
      to: to.as_str(),
    };

    let cast = match (self, to) {
      (ColumnData::Int64(v), DType::Int8) => ColumnData::Int8(
        v.iter()
          .map(|x| {
            i8::try_from(*x).map_err(|_| FrameError::Overflow {
              column: column.to_string(),
              value: *x,
              to: "int8",
            })
          })
          .collect::<Result<_, _>>()?,
      ),
      (ColumnData::Int64(v), DType::Float32) => ColumnData::Float32(v.iter().map(|x| *x as f32).collect()),
      (ColumnData::Int64(v), DType::Float64) => ColumnData::Float64(v.iter().map(|x| *x as f64).collect()),
      (ColumnData::Int8(v), DType::Int64) => ColumnData::Int64(v.iter().map(|x| i64::from(*x)).collect()),
      (ColumnData::Int8(v), DType::Float32) => ColumnData::Float32(v.iter().map(|x| f32::from(*x)).collect()),
      (ColumnData::Int8(v), DType::Float64) => ColumnData::Float64(v.iter().map(|x| f64::from(*x)).collect()),
      (ColumnData::Float64(v), DType::Float32) => ColumnData::Float32(v.iter().map(|x| *x as f32).collect()),
      (ColumnData::Float32(v), DType::Float64) => ColumnData::Float64(v.iter().map(|x| f64::from(*x)).collect()),
      (ColumnData::Bool(v), DType::Int8) => ColumnData::Int8(v.iter().map(|x| i8::from(*x)).collect()),
      (ColumnData::Bool(v), DType::Int64) => ColumnData::Int64(v.iter().map(|x| i64::from(*x)).collect()),
      (ColumnData::String(v), DType::Category) => ColumnData::Category(Categorical::from_values(column, v)?),
      (ColumnData::Category(v), DType::String) => ColumnData::String(v.iter().map(str::to_string).collect()),
      (_, DType::String) => ColumnData::String((0..self.len()).map(|r| self.cell(r).to_string()).collect()),
      _ => return Err(unsupported()),
    };

    Ok(cast)
  }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
  pub name: String,
  pub data: ColumnData,
}

impl Column {
  pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
    Self {
      name: name.into(),
      data,
    }
  }
}

/// `(rows, columns)` of a frame. Renders as the literal `"(rows, cols)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
  pub rows: usize,
  pub columns: usize,
}

impl Shape {
  pub fn new(rows: usize, columns: usize) -> Self {
    Self { rows, columns }
  }
}

impl fmt::Display for Shape {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", self.rows, self.columns)
  }
}

impl FromStr for Shape {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let inner = s
      .trim()
      .strip_prefix('(')
      .and_then(|rest| rest.strip_suffix(')'))
      .ok_or_else(|| s.to_string())?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match parts.as_slice() {
      [rows, columns] => {
        let rows = rows.parse().map_err(|_| s.to_string())?;
        let columns = columns.parse().map_err(|_| s.to_string())?;
        Ok(Shape { rows, columns })
      }
      _ => Err(s.to_string()),
    }
  }
}

impl From<(usize, usize)> for Shape {
  fn from((rows, columns): (usize, usize)) -> Self {
    Self { rows, columns }
  }
}

/// An ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
  columns: Vec<Column>,
}

impl Frame {
  pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
    let mut frame = Frame::default();
    for column in columns {
      frame.push_column(column)?;
    }
    Ok(frame)
  }

  /// Appends a column, enforcing unique names and a consistent row count.
  pub fn push_column(&mut self, column: Column) -> Result<(), FrameError> {
    if column.name == INDEX_COLUMN {
      return Err(FrameError::ReservedName(column.name));
    }
    if self.columns.iter().any(|c| c.name == column.name) {
      return Err(FrameError::DuplicateColumn(column.name));
    }
    if let Some(first) = self.columns.first() {
      let expected = first.data.len();
      if column.data.len() != expected {
        return Err(FrameError::LengthMismatch {
          column: column.name,
          expected,
          actual: column.data.len(),
        });
      }
    }
    self.columns.push(column);
    Ok(())
  }

  pub fn num_rows(&self) -> usize {
    self.columns.first().map_or(0, |c| c.data.len())
  }

  pub fn num_columns(&self) -> usize {
    self.columns.len()
  }

  pub fn shape(&self) -> Shape {
    Shape::new(self.num_rows(), self.num_columns())
  }

  pub fn columns(&self) -> &[Column] {
    &self.columns
  }

  pub fn into_columns(self) -> Vec<Column> {
    self.columns
  }

  pub fn column_names(&self) -> impl Iterator<Item = &str> {
    self.columns.iter().map(|c| c.name.as_str())
  }

  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }

  fn column_mut(&mut self, name: &str) -> Result<&mut Column, FrameError> {
    self
      .columns
      .iter_mut()
      .find(|c| c.name == name)
      .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))
  }

  /// Converts a column to another dtype in place.
  pub fn cast(&mut self, name: &str, to: DType) -> Result<(), FrameError> {
    let column = self.column_mut(name)?;
    column.data = column.data.cast(name, to)?;
    Ok(())
  }

  /// Sets `target` to whether each value of the string column `source`
  /// equals `truthy`. An existing `target` column is replaced.
  pub fn derive_flag(&mut self, source: &str, target: &str, truthy: &str) -> Result<(), FrameError> {
    let column = self
      .column(source)
      .ok_or_else(|| FrameError::ColumnNotFound(source.to_string()))?;

    let flags: Vec<bool> = match &column.data {
      ColumnData::String(v) => v.iter().map(|s| s == truthy).collect(),
      ColumnData::Category(v) => v.iter().map(|s| s == truthy).collect(),
      other => {
        return Err(FrameError::UnsupportedCast {
          column: source.to_string(),
          from: other.dtype().as_str(),
          to: DType::Bool.as_str(),
        });
      }
    };

    match self.column_mut(target) {
      Ok(existing) => existing.data = ColumnData::Bool(flags),
      Err(_) => self.push_column(Column::new(target, ColumnData::Bool(flags)))?,
    }
    Ok(())
  }

  /// Stable in-place sort of all rows by one column.
  pub fn sort_by(&mut self, name: &str, ascending: bool) -> Result<(), FrameError> {
    let key = &self
      .column(name)
      .ok_or_else(|| FrameError::ColumnNotFound(name.to_string()))?
      .data;

    let mut order: Vec<usize> = (0..self.num_rows()).collect();
    if ascending {
      order.sort_by(|a, b| key.compare_rows(*a, *b));
    } else {
      order.sort_by(|a, b| key.compare_rows(*b, *a));
    }

    for column in &mut self.columns {
      column.data = column.data.take(&order);
    }
    Ok(())
  }

  /// First `n` rows as a new frame.
  pub fn head(&self, n: usize) -> Frame {
    let rows: Vec<usize> = (0..n.min(self.num_rows())).collect();
    Frame {
      columns: self
        .columns
        .iter()
        .map(|c| Column::new(c.name.clone(), c.data.take(&rows)))
        .collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Frame {
    Frame::new(vec![
      Column::new("n", ColumnData::Int64(vec![3, 1, 2])),
      Column::new(
        "team",
        ColumnData::String(vec!["cyan".into(), "black".into(), "cyan".into()]),
      ),
    ])
    .unwrap()
  }

  #[test]
  fn shape_literal_parses_back() {
    let shape = Shape::new(100, 7);
    assert_eq!(shape.to_string(), "(100, 7)");
    assert_eq!("(100, 7)".parse::<Shape>().unwrap(), shape);
    assert_eq!(" (3,4) ".parse::<Shape>().unwrap(), Shape::new(3, 4));
    assert!("(1, 2, 3)".parse::<Shape>().is_err());
    assert!("1, 2".parse::<Shape>().is_err());
  }

  #[test]
  fn rejects_mismatched_lengths_and_reserved_names() {
    let mut frame = sample();
    let err = frame
      .push_column(Column::new("x", ColumnData::Bool(vec![true])))
      .unwrap_err();
    assert!(matches!(err, FrameError::LengthMismatch { expected: 3, actual: 1, .. }));

    let err = frame
      .push_column(Column::new(INDEX_COLUMN, ColumnData::Bool(vec![true; 3])))
      .unwrap_err();
    assert!(matches!(err, FrameError::ReservedName(_)));

    let err = frame
      .push_column(Column::new("n", ColumnData::Bool(vec![true; 3])))
      .unwrap_err();
    assert!(matches!(err, FrameError::DuplicateColumn(_)));
  }

  #[test]
  fn category_cast_sorts_categories() {
    let mut frame = sample();
    frame.cast("team", DType::Category).unwrap();
    let ColumnData::Category(cat) = &frame.column("team").unwrap().data else {
      panic!("expected category");
    };
    assert_eq!(cat.categories(), ["black", "cyan"]);
    assert_eq!(cat.codes(), [1, 0, 1]);
    assert_eq!(cat.iter().collect::<Vec<_>>(), ["cyan", "black", "cyan"]);
  }

  #[test]
  fn narrowing_cast_reports_overflow() {
    let mut frame = Frame::new(vec![Column::new("n", ColumnData::Int64(vec![1, 300]))]).unwrap();
    let err = frame.cast("n", DType::Int8).unwrap_err();
    assert!(matches!(err, FrameError::Overflow { value: 300, .. }));
  }

  #[test]
  fn sort_reorders_every_column() {
    let mut frame = sample();
    frame.sort_by("n", false).unwrap();
    assert_eq!(frame.column("n").unwrap().data, ColumnData::Int64(vec![3, 2, 1]));
    assert_eq!(
      frame.column("team").unwrap().data,
      ColumnData::String(vec!["cyan".into(), "cyan".into(), "black".into()])
    );
  }

  #[test]
  fn derive_flag_appends_bool_column() {
    let mut frame = sample();
    frame.derive_flag("team", "is_cyan", "cyan").unwrap();
    assert_eq!(frame.shape(), Shape::new(3, 3));
    assert_eq!(
      frame.column("is_cyan").unwrap().data,
      ColumnData::Bool(vec![true, false, true])
    );
  }
}
