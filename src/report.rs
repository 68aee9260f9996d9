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

//! Result table and Markdown summary of a benchmark run.

use crate::benchmark::BenchmarkRow;
use crate::error::ReportError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Default file name of the flat results table.
pub const RESULTS_CSV: &str = "results.csv";

/// Default file name of the Markdown summary.
pub const REPORT_MARKDOWN: &str = "report.md";

const METRICS: [&str; 3] = ["time_seconds", "memory_usage_mb", "file_size_mb"];

/// Writes every row, headed by the field names.
pub fn write_results_csv(rows: &[BenchmarkRow], path: &Path) -> Result<(), ReportError> {
  let mut writer = csv::Writer::from_path(path)?;
  for row in rows {
    writer.serialize(row)?;
  }
  writer.flush()?;
  Ok(())
}

/// Arithmetic mean, `None` for an empty input.
fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
  let (sum, count) = values
    .into_iter()
    .fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
  (count > 0).then(|| sum / count as f64)
}

/// Pearson correlation coefficient. `None` when fewer than two pairs are
/// given or either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
  if xs.len() != ys.len() || xs.len() < 2 {
    return None;
  }
  let mean_x = mean(xs.iter().copied())?;
  let mean_y = mean(ys.iter().copied())?;

  let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
  for (x, y) in xs.iter().zip(ys) {
    let dx = x - mean_x;
    let dy = y - mean_y;
    covariance += dx * dy;
    var_x += dx * dx;
    var_y += dy * dy;
  }

  if var_x == 0.0 || var_y == 0.0 {
    return None;
  }
  Some(covariance / (var_x.sqrt() * var_y.sqrt()))
}

fn cell(value: Option<f64>, precision: usize) -> String {
  value
    .map(|v| format!("{:.*}", precision, v))
    .unwrap_or_else(|| "N/A".to_string())
}

/// Per-group means of time, memory and file size.
#[derive(Debug, Default)]
struct Summary {
  runs: usize,
  time: Vec<f64>,
  memory: Vec<f64>,
  file_size: Vec<f64>,
}

impl Summary {
  fn add(&mut self, row: &BenchmarkRow) {
    self.runs += 1;
    self.time.push(row.time_seconds);
    self.memory.push(row.memory_usage_mb);
    self.file_size.extend(row.file_size_mb);
  }

  fn mean_time(&self) -> Option<f64> {
    mean(self.time.iter().copied())
  }

  fn mean_memory(&self) -> Option<f64> {
    mean(self.memory.iter().copied())
  }

  fn mean_file_size(&self) -> Option<f64> {
    mean(self.file_size.iter().copied())
  }
}

fn group_by<K: Ord>(rows: &[BenchmarkRow], key: impl Fn(&BenchmarkRow) -> K) -> BTreeMap<K, Summary> {
  let mut groups: BTreeMap<K, Summary> = BTreeMap::new();
  for row in rows {
    groups.entry(key(row)).or_default().add(row);
  }
  groups
}

/// Correlation matrix over rows that carry a file size.
fn correlation_matrix(rows: &[BenchmarkRow]) -> [[Option<f64>; 3]; 3] {
  let sized: Vec<&BenchmarkRow> = rows.iter().filter(|row| row.file_size_mb.is_some()).collect();
  let columns: [Vec<f64>; 3] = [
    sized.iter().map(|row| row.time_seconds).collect(),
    sized.iter().map(|row| row.memory_usage_mb).collect(),
    sized.iter().filter_map(|row| row.file_size_mb).collect(),
  ];

  let mut matrix = [[None; 3]; 3];
  for (i, row) in matrix.iter_mut().enumerate() {
    for (j, value) in row.iter_mut().enumerate() {
      *value = pearson(&columns[i], &columns[j]);
    }
  }
  matrix
}

/// Renders the Markdown summary of `rows`.
pub fn render_markdown(rows: &[BenchmarkRow]) -> String {
  let mut md = String::new();
  let by_method = group_by(rows, |row| row.method_name.clone());

  md.push_str("# File Format Benchmark Report\n\n");
  md.push_str(&format!("**Generated:** {}\n\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
  md.push_str(&format!("**Observations:** {}\n\n", rows.len()));

  md.push_str("## Mean Time by Method\n\n");
  md.push_str("| Method | Runs | Mean Time (s) |\n");
  md.push_str("|--------|------|---------------|\n");
  for (method, summary) in &by_method {
    md.push_str(&format!("| {} | {} | {} |\n", method, summary.runs, cell(summary.mean_time(), 5)));
  }

  md.push_str("\n## Time vs Memory Usage\n\n");
  md.push_str("| Method | Mean Time (s) | Mean Memory (MB) |\n");
  md.push_str("|--------|---------------|------------------|\n");
  for (method, summary) in &by_method {
    md.push_str(&format!(
      "| {} | {} | {} |\n",
      method,
      cell(summary.mean_time(), 5),
      cell(summary.mean_memory(), 3)
    ));
  }

  md.push_str("\n## File Size vs Time\n\n");
  md.push_str("| Method | Mean File Size (MB) | Mean Time (s) |\n");
  md.push_str("|--------|---------------------|---------------|\n");
  for (method, summary) in &by_method {
    md.push_str(&format!(
      "| {} | {} | {} |\n",
      method,
      cell(summary.mean_file_size(), 3),
      cell(summary.mean_time(), 5)
    ));
  }

  md.push_str("\n## Correlation\n\n");
  md.push_str(&format!("| | {} |\n", METRICS.join(" | ")));
  md.push_str("|---|---|---|---|\n");
  for (name, values) in METRICS.iter().zip(correlation_matrix(rows)) {
    let cells: Vec<String> = values.iter().map(|value| cell(*value, 3)).collect();
    md.push_str(&format!("| {} | {} |\n", name, cells.join(" | ")));
  }

  md.push_str("\n## By Dataframe Size\n\n");
  md.push_str("| Size | Optimized | Mean Time (s) | Mean Memory (MB) | Mean File Size (MB) |\n");
  md.push_str("|------|-----------|---------------|------------------|---------------------|\n");
  for ((size, optimized), summary) in group_by(rows, |row| (row.dataframe_size, row.is_datatype_optimized)) {
    md.push_str(&format!(
      "| {} | {} | {} | {} | {} |\n",
      size,
      optimized,
      cell(summary.mean_time(), 5),
      cell(summary.mean_memory(), 3),
      cell(summary.mean_file_size(), 3)
    ));
  }

  md
}

/// Exports the Markdown summary of `rows` to `path`.
pub fn export_markdown(rows: &[BenchmarkRow], path: &Path) -> Result<(), ReportError> {
  fs::write(path, render_markdown(rows))?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::codec::FileFormat;
  use tempfile::NamedTempFile;

  fn row(method: &str, size: usize, time: f64, memory: f64, file: Option<f64>) -> BenchmarkRow {
    BenchmarkRow {
      method_name: method.to_string(),
      file_format: FileFormat::Csv,
      dataframe_size: size,
      is_datatype_optimized: false,
      time_seconds: time,
      memory_usage_mb: memory,
      file_size_mb: file,
    }
  }

  #[test]
  fn pearson_detects_linear_relationships() {
    let xs = [1.0, 2.0, 3.0, 4.0];
    let up = [2.0, 4.0, 6.0, 8.0];
    let down = [8.0, 6.0, 4.0, 2.0];
    assert!((pearson(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
    assert!((pearson(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    assert_eq!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
    assert_eq!(pearson(&[1.0], &[2.0]), None);
  }

  #[test]
  fn markdown_lists_methods_and_sizes() {
    let rows = vec![
      row("to_csv", 10, 0.5, 1.0, Some(2.0)),
      row("read_csv", 10, 0.25, 1.0, Some(2.0)),
      row("to_csv", 20, 1.5, 2.0, Some(4.0)),
    ];
    let md = render_markdown(&rows);

    assert!(md.contains("## Mean Time by Method"));
    assert!(md.contains("| to_csv | 2 | 1.00000 |"));
    assert!(md.contains("| read_csv | 1 | 0.25000 |"));
    assert!(md.contains("## Correlation"));
    assert!(md.contains("| 20 | false | 1.50000 | 2.000 | 4.000 |"));
  }

  #[test]
  fn results_csv_has_header_and_rows() {
    let temp = NamedTempFile::new().unwrap();
    write_results_csv(&[row("to_json", 5, 0.1, 0.5, None)], temp.path()).unwrap();

    let content = fs::read_to_string(temp.path()).unwrap();
    let mut lines = content.lines();
    assert_eq!(
      lines.next(),
      Some("method_name,file_format,dataframe_size,is_datatype_optimized,time_seconds,memory_usage_mb,file_size_mb")
    );
    assert_eq!(lines.next(), Some("to_json,csv,5,false,0.1,0.5,"));
  }
}
