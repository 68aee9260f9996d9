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

//! Parquet via Arrow record batches.
//!
//! Category columns are written as `Dictionary(Int32, Utf8)` arrays and the
//! Arrow schema is embedded in the file, so they read back as categories.

use crate::error::CodecError;
use crate::frame::Categorical;
use crate::frame::Column;
use crate::frame::ColumnData;
use crate::frame::Frame;
use arrow::array::Array;
use arrow::array::ArrayRef;
use arrow::array::AsArray;
use arrow::array::BooleanArray;
use arrow::array::Date32Array;
use arrow::array::DictionaryArray;
use arrow::array::Float32Array;
use arrow::array::Float64Array;
use arrow::array::Int8Array;
use arrow::array::Int32Array;
use arrow::array::Int64Array;
use arrow::array::StringArray;
use arrow::datatypes::DataType;
use arrow::datatypes::Date32Type;
use arrow::datatypes::Float32Type;
use arrow::datatypes::Float64Type;
use arrow::datatypes::Int8Type;
use arrow::datatypes::Int32Type;
use arrow::datatypes::Int64Type;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use chrono::NaiveDate;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::basic::GzipLevel;
use parquet::basic::ZstdLevel;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// `num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Page compression codec for written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParquetCompression {
  #[default]
  Snappy,
  Zstd,
  Gzip,
  None,
}

impl ParquetCompression {
  fn codec(self) -> Compression {
    match self {
      ParquetCompression::Snappy => Compression::SNAPPY,
      ParquetCompression::Zstd => Compression::ZSTD(ZstdLevel::default()),
      ParquetCompression::Gzip => Compression::GZIP(GzipLevel::default()),
      ParquetCompression::None => Compression::UNCOMPRESSED,
    }
  }
}

impl FromStr for ParquetCompression {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "snappy" => Ok(ParquetCompression::Snappy),
      "zstd" => Ok(ParquetCompression::Zstd),
      "gzip" => Ok(ParquetCompression::Gzip),
      "none" | "uncompressed" => Ok(ParquetCompression::None),
      _ => Err(format!("unknown parquet compression: {s}")),
    }
  }
}

fn days_since_epoch(date: &NaiveDate) -> i32 {
  date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_days(column: &str, days: i32) -> Result<NaiveDate, CodecError> {
  days
    .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
    .and_then(NaiveDate::from_num_days_from_ce_opt)
    .ok_or_else(|| CodecError::DateOutOfRange {
      column: column.to_string(),
      days,
    })
}

fn to_array(data: &ColumnData) -> Result<ArrayRef, CodecError> {
  let array: ArrayRef = match data {
    ColumnData::Bool(v) => Arc::new(BooleanArray::from(v.clone())),
    ColumnData::Int8(v) => Arc::new(Int8Array::from(v.clone())),
    ColumnData::Int64(v) => Arc::new(Int64Array::from(v.clone())),
    ColumnData::Float32(v) => Arc::new(Float32Array::from(v.clone())),
    ColumnData::Float64(v) => Arc::new(Float64Array::from(v.clone())),
    ColumnData::String(v) => Arc::new(StringArray::from_iter_values(v.iter())),
    ColumnData::Date(v) => Arc::new(Date32Array::from(
      v.iter().map(days_since_epoch).collect::<Vec<_>>(),
    )),
    ColumnData::Category(c) => {
      let keys = Int32Array::from_iter_values(c.codes().iter().map(|k| i32::from(*k)));
      let values = StringArray::from_iter_values(c.categories().iter());
      Arc::new(DictionaryArray::<Int32Type>::try_new(keys, Arc::new(values))?)
    }
  };
  Ok(array)
}

fn to_record_batch(frame: &Frame) -> Result<RecordBatch, CodecError> {
  if frame.num_columns() == 0 {
    return Ok(RecordBatch::new_empty(Arc::new(Schema::empty())));
  }
  let arrays = frame
    .columns()
    .iter()
    .map(|c| Ok((c.name.as_str(), to_array(&c.data)?)))
    .collect::<Result<Vec<_>, CodecError>>()?;
  Ok(RecordBatch::try_from_iter(arrays)?)
}

pub fn write_parquet(frame: &Frame, path: &Path, compression: ParquetCompression) -> Result<(), CodecError> {
  let batch = to_record_batch(frame)?;
  let props = WriterProperties::builder()
    .set_compression(compression.codec())
    .build();

  let file = File::create(path)?;
  let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
  writer.write(&batch)?;
  writer.close()?;
  Ok(())
}

/// Collects one column across record batches.
enum Accumulator {
  Data(ColumnData),
  Category(Vec<String>),
}

impl Accumulator {
  fn for_type(column: &str, data_type: &DataType) -> Result<Self, CodecError> {
    let acc = match data_type {
      DataType::Boolean => Accumulator::Data(ColumnData::Bool(Vec::new())),
      DataType::Int8 => Accumulator::Data(ColumnData::Int8(Vec::new())),
      DataType::Int64 => Accumulator::Data(ColumnData::Int64(Vec::new())),
      DataType::Float32 => Accumulator::Data(ColumnData::Float32(Vec::new())),
      DataType::Float64 => Accumulator::Data(ColumnData::Float64(Vec::new())),
      DataType::Utf8 | DataType::LargeUtf8 => Accumulator::Data(ColumnData::String(Vec::new())),
      DataType::Date32 => Accumulator::Data(ColumnData::Date(Vec::new())),
      DataType::Dictionary(key, value)
        if key.as_ref() == &DataType::Int32 && value.as_ref() == &DataType::Utf8 =>
      {
        Accumulator::Category(Vec::new())
      }
      other => {
        return Err(CodecError::UnsupportedType {
          column: column.to_string(),
          data_type: other.to_string(),
        });
      }
    };
    Ok(acc)
  }

  fn append(&mut self, column: &str, array: &ArrayRef) -> Result<(), CodecError> {
    if array.null_count() > 0 {
      return Err(CodecError::NullValues {
        column: column.to_string(),
      });
    }

    match self {
      Accumulator::Data(ColumnData::Bool(v)) => v.extend(array.as_boolean().values().iter()),
      Accumulator::Data(ColumnData::Int8(v)) => v.extend_from_slice(array.as_primitive::<Int8Type>().values()),
      Accumulator::Data(ColumnData::Int64(v)) => v.extend_from_slice(array.as_primitive::<Int64Type>().values()),
      Accumulator::Data(ColumnData::Float32(v)) => {
        v.extend_from_slice(array.as_primitive::<Float32Type>().values())
      }
      Accumulator::Data(ColumnData::Float64(v)) => {
        v.extend_from_slice(array.as_primitive::<Float64Type>().values())
      }
      Accumulator::Data(ColumnData::String(v)) => match array.data_type() {
        DataType::LargeUtf8 => v.extend(array.as_string::<i64>().iter().flatten().map(str::to_string)),
        _ => v.extend(array.as_string::<i32>().iter().flatten().map(str::to_string)),
      },
      Accumulator::Data(ColumnData::Date(v)) => {
        for days in array.as_primitive::<Date32Type>().values().iter() {
          v.push(date_from_days(column, *days)?);
        }
      }
      Accumulator::Data(ColumnData::Category(_)) => {
        return Err(CodecError::UnsupportedType {
          column: column.to_string(),
          data_type: array.data_type().to_string(),
        });
      }
      Accumulator::Category(v) => {
        let dictionary = array.as_dictionary::<Int32Type>();
        let categories = dictionary.values().as_string::<i32>();
        for key in dictionary.keys().values().iter() {
          v.push(categories.value(*key as usize).to_string());
        }
      }
    }
    Ok(())
  }

  fn finish(self, column: &str) -> Result<ColumnData, CodecError> {
    match self {
      Accumulator::Data(data) => Ok(data),
      Accumulator::Category(values) => Ok(ColumnData::Category(Categorical::from_values(column, &values)?)),
    }
  }
}

pub fn read_parquet(path: &Path) -> Result<Frame, CodecError> {
  let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
  let schema = builder.schema().clone();
  let reader = builder.build()?;

  let mut accumulators = schema
    .fields()
    .iter()
    .map(|field| Accumulator::for_type(field.name(), field.data_type()))
    .collect::<Result<Vec<_>, _>>()?;

  for batch in reader {
    let batch = batch?;
    for ((field, acc), array) in schema.fields().iter().zip(&mut accumulators).zip(batch.columns()) {
      acc.append(field.name(), array)?;
    }
  }

  let columns = schema
    .fields()
    .iter()
    .zip(accumulators)
    .map(|(field, acc)| Ok(Column::new(field.name().clone(), acc.finish(field.name())?)))
    .collect::<Result<Vec<_>, CodecError>>()?;

  Ok(Frame::new(columns)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn epoch_days_round_trip() {
    let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let days = days_since_epoch(&date);
    assert_eq!(days, 16_436);
    assert_eq!(date_from_days("d", days).unwrap(), date);
    assert_eq!(days_since_epoch(&NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
  }
}
