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

//! Deep memory accounting for frames.
//!
//! Fixed-width columns count `size_of::<T>() * rows`. String columns also
//! count the heap bytes of every value, and category columns count their
//! codes plus the dictionary, so the figures track how much a dtype
//! optimization actually saves.

use crate::frame::ColumnData;
use crate::frame::Frame;
use crate::frame::INDEX_COLUMN;
use std::collections::BTreeMap;
use std::mem::size_of;
use std::ops::Range;

/// Per-column memory footprint in bytes, keyed by column name plus the
/// [`INDEX_COLUMN`] pseudo-column.
pub type MemoryBreakdown = BTreeMap<String, u64>;

fn string_bytes(value: &str) -> u64 {
  (size_of::<String>() + value.len()) as u64
}

/// Deep footprint of one column.
pub fn column_memory(data: &ColumnData) -> u64 {
  fn fixed<T>(values: &[T]) -> u64 {
    (size_of::<T>() * values.len()) as u64
  }

  match data {
    ColumnData::Bool(v) => fixed(v),
    ColumnData::Int8(v) => fixed(v),
    ColumnData::Int64(v) => fixed(v),
    ColumnData::Float32(v) => fixed(v),
    ColumnData::Float64(v) => fixed(v),
    ColumnData::Date(v) => fixed(v),
    ColumnData::String(v) => v.iter().map(|s| string_bytes(s)).sum(),
    ColumnData::Category(v) => {
      fixed(v.codes()) + v.categories().iter().map(|s| string_bytes(s)).sum::<u64>()
    }
  }
}

/// Memory footprint of every column plus the range index.
pub fn memory_breakdown(frame: &Frame) -> MemoryBreakdown {
  let mut breakdown = MemoryBreakdown::new();
  breakdown.insert(INDEX_COLUMN.to_string(), size_of::<Range<usize>>() as u64);
  for column in frame.columns() {
    breakdown.insert(column.name.clone(), column_memory(&column.data));
  }
  breakdown
}

/// Percentage change per column between two breakdowns. Columns missing from
/// either side, or with a zero baseline, are left out.
pub fn percentage_difference(before: &MemoryBreakdown, after: &MemoryBreakdown) -> BTreeMap<String, f64> {
  before
    .iter()
    .filter(|(_, base)| **base > 0)
    .filter_map(|(name, base)| {
      after.get(name).map(|now| {
        let change = (*now as f64 - *base as f64) / *base as f64 * 100.0;
        (name.clone(), change)
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Column;
  use crate::frame::DType;

  #[test]
  fn breakdown_includes_index_and_deep_strings() {
    let frame = Frame::new(vec![
      Column::new("n", ColumnData::Int64(vec![1, 2])),
      Column::new("s", ColumnData::String(vec!["ab".into(), "cde".into()])),
    ])
    .unwrap();

    let breakdown = memory_breakdown(&frame);
    assert_eq!(breakdown["n"], 16);
    assert_eq!(breakdown["s"], (2 * size_of::<String>() + 5) as u64);
    assert_eq!(breakdown[INDEX_COLUMN], size_of::<Range<usize>>() as u64);
  }

  #[test]
  fn category_cast_shrinks_repetitive_strings() {
    let values: Vec<String> = (0..1000).map(|i| ["win", "lose"][i % 2].to_string()).collect();
    let mut frame = Frame::new(vec![Column::new("result", ColumnData::String(values))]).unwrap();
    let before = memory_breakdown(&frame);
    frame.cast("result", DType::Category).unwrap();
    let after = memory_breakdown(&frame);

    let diff = percentage_difference(&before, &after);
    assert!(diff["result"] < -80.0);
    assert_eq!(diff[INDEX_COLUMN], 0.0);
  }
}
