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

//! Synthetic datasets used by the benchmarks.
//!
//! Generation is deterministic for a given RNG seed. Each dataset has a raw
//! form (wide `int64`/`float64`/`string` columns) and an optimized form with
//! narrowed numeric types and categorical strings.

use crate::error::FrameError;
use crate::frame::Column;
use crate::frame::ColumnData;
use crate::frame::DType;
use crate::frame::Frame;
use chrono::Days;
use chrono::NaiveDate;
use clap::ValueEnum;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde::Serialize;

const SIZES: [&str; 3] = ["big", "medium", "small"];
const TEAMS: [&str; 5] = ["yellow", "cyan", "magenta", "violet", "black"];
const RESULTS: [&str; 2] = ["win", "lose"];
const HAPPY_FOODS: [&str; 5] = ["pizza", "hamburguer", "fried-chicken", "nachos", "grilled-meat"];
const SAD_FOODS: [&str; 5] = ["beef-liver", "tomatoes", "broccoli", "soup", "beans"];

/// Which synthetic dataset a benchmark run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DatasetKind {
  #[default]
  TeamResults,
  Scores,
}

impl DatasetKind {
  pub fn generate<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<Frame, FrameError> {
    match self {
      DatasetKind::TeamResults => generate_team_results(size, rng),
      DatasetKind::Scores => generate_scores(size, rng),
    }
  }

  pub fn optimize(&self, frame: Frame) -> Result<Frame, FrameError> {
    match self {
      DatasetKind::TeamResults => optimize_team_results(frame),
      DatasetKind::Scores => optimize_scores(frame),
    }
  }
}

fn choices<R: Rng + ?Sized>(options: &[&str], size: usize, rng: &mut R) -> ColumnData {
  ColumnData::String(
    (0..size)
      .map(|_| options.choose(rng).copied().unwrap_or_default().to_string())
      .collect(),
  )
}

fn ints<R: Rng + ?Sized>(range: std::ops::Range<i64>, size: usize, rng: &mut R) -> ColumnData {
  ColumnData::Int64((0..size).map(|_| rng.random_range(range.clone())).collect())
}

fn unit_floats<R: Rng + ?Sized>(size: usize, rng: &mut R) -> ColumnData {
  ColumnData::Float64((0..size).map(|_| rng.random::<f64>()).collect())
}

fn days<R: Rng + ?Sized>(first: NaiveDate, last: NaiveDate, size: usize, rng: &mut R) -> ColumnData {
  let span = last.signed_duration_since(first).num_days().max(0) as u64;
  ColumnData::Date(
    (0..size)
      .map(|_| {
        let offset = rng.random_range(0..=span);
        first.checked_add_days(Days::new(offset)).unwrap_or(last)
      })
      .collect(),
  )
}

/// Team match results: `size`, `age`, `team`, `result`, `date`, `prob`.
pub fn generate_team_results<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Frame, FrameError> {
  let first = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default();
  let last = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap_or_default();

  Frame::new(vec![
    Column::new("size", choices(&SIZES, size, rng)),
    Column::new("age", ints(1..50, size, rng)),
    Column::new("team", choices(&TEAMS, size, rng)),
    Column::new("result", choices(&RESULTS, size, rng)),
    Column::new("date", days(first, last, size, rng)),
    Column::new("prob", unit_floats(size, rng)),
  ])
}

/// Narrows the team results types and derives the boolean `win` column.
pub fn optimize_team_results(mut frame: Frame) -> Result<Frame, FrameError> {
  frame.cast("size", DType::Category)?;
  frame.cast("age", DType::Int8)?;
  frame.cast("team", DType::Category)?;
  frame.derive_flag("result", "win", "win")?;
  frame.cast("prob", DType::Float32)?;
  Ok(frame)
}

/// Student test scores: ages, study time, three scores and two food choices.
pub fn generate_scores<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Frame, FrameError> {
  Frame::new(vec![
    Column::new("age", ints(12..20, size, rng)),
    Column::new("study_time", ints(0..11, size, rng)),
    Column::new("test_1_score", unit_floats(size, rng)),
    Column::new("test_2_score", unit_floats(size, rng)),
    Column::new("test_3_score", unit_floats(size, rng)),
    Column::new("happy_food", choices(&HAPPY_FOODS, size, rng)),
    Column::new("sad_food", choices(&SAD_FOODS, size, rng)),
  ])
}

pub fn optimize_scores(mut frame: Frame) -> Result<Frame, FrameError> {
  frame.cast("age", DType::Int8)?;
  frame.cast("study_time", DType::Int8)?;
  for score in ["test_1_score", "test_2_score", "test_3_score"] {
    frame.cast(score, DType::Float32)?;
  }
  frame.cast("happy_food", DType::Category)?;
  frame.cast("sad_food", DType::Category)?;
  Ok(frame)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frame::Shape;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  #[test]
  fn team_results_are_deterministic_per_seed() {
    let a = generate_team_results(50, &mut StdRng::seed_from_u64(7)).unwrap();
    let b = generate_team_results(50, &mut StdRng::seed_from_u64(7)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.shape(), Shape::new(50, 6));
  }

  #[test]
  fn optimized_team_results_gain_win_column() {
    let raw = generate_team_results(200, &mut StdRng::seed_from_u64(1)).unwrap();
    let optimized = optimize_team_results(raw.clone()).unwrap();
    assert_eq!(optimized.shape(), Shape::new(200, 7));
    assert_eq!(optimized.column("age").unwrap().data.dtype(), DType::Int8);
    assert_eq!(optimized.column("team").unwrap().data.dtype(), DType::Category);

    let ColumnData::String(results) = &raw.column("result").unwrap().data else {
      panic!("result should stay a string column");
    };
    let ColumnData::Bool(wins) = &optimized.column("win").unwrap().data else {
      panic!("win should be boolean");
    };
    for (result, win) in results.iter().zip(wins) {
      assert_eq!(result == "win", *win);
    }
  }

  #[test]
  fn scores_respect_requested_size() {
    let frame = generate_scores(123, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(frame.shape(), Shape::new(123, 7));
    let optimized = optimize_scores(frame).unwrap();
    assert_eq!(optimized.column("sad_food").unwrap().data.dtype(), DType::Category);
  }
}
