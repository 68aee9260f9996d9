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
use crate::frame::Shape;
use crate::memory::MemoryBreakdown;
use serde::Serialize;
use std::fmt;

/// One observed execution of a timed operation.
///
/// Built once, right after the operation returns, and never mutated. The
/// total memory is always derived from the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
  operation_name: String,
  subject_type_name: String,
  shape: Shape,
  memory_bytes: u64,
  memory_breakdown: MemoryBreakdown,
  elapsed_seconds: f64,
  file_size_bytes: Option<u64>,
}

impl Measurement {
  pub fn new(
    operation_name: impl Into<String>,
    subject_type_name: impl Into<String>,
    shape: Shape,
    memory_breakdown: MemoryBreakdown,
    elapsed_seconds: f64,
    file_size_bytes: Option<u64>,
  ) -> Self {
    Self {
      operation_name: operation_name.into(),
      subject_type_name: subject_type_name.into(),
      shape,
      memory_bytes: memory_breakdown.values().sum(),
      memory_breakdown,
      elapsed_seconds: elapsed_seconds.max(0.0),
      file_size_bytes,
    }
  }

  pub fn operation_name(&self) -> &str {
    &self.operation_name
  }

  pub fn subject_type_name(&self) -> &str {
    &self.subject_type_name
  }

  pub fn shape(&self) -> Shape {
    self.shape
  }

  pub fn memory_bytes(&self) -> u64 {
    self.memory_bytes
  }

  pub fn memory_breakdown(&self) -> &MemoryBreakdown {
    &self.memory_breakdown
  }

  pub fn elapsed_seconds(&self) -> f64 {
    self.elapsed_seconds
  }

  pub fn file_size_bytes(&self) -> Option<u64> {
    self.file_size_bytes
  }
}

impl fmt::Display for Measurement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Method: {}", self.operation_name)?;
    writeln!(f, "Class: {}", self.subject_type_name)?;
    writeln!(f, "Shape: {}", self.shape)?;
    writeln!(f, "Memory Usage: {}", self.memory_bytes)?;
    writeln!(f, "Memory Usage Detail:")?;
    for (column, bytes) in &self.memory_breakdown {
      writeln!(f, "  {column}: {bytes}")?;
    }
    writeln!(f, "Elapsed Time: {:.5} seconds", self.elapsed_seconds)?;
    match self.file_size_bytes {
      Some(size) => write!(f, "File Size: {size}"),
      None => write!(f, "File Size: None"),
    }
  }
}
