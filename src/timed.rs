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

//! Timing wrapper around a [`Frame`].
//!
//! [`TimedFrame::time`] runs one named operation, measures how long it took
//! and how much memory the resulting data occupies, and hands back both the
//! operation's own output and a [`Measurement`].
//!
//! * **Load mode** (`TimeOptions::read()`): the name resolves to a loader. Its
//!   first argument must be an existing file, whose size is taken before the
//!   read. Shape and memory describe the loaded frame.
//! * **Transform mode** (default): the name resolves to a method on the
//!   wrapped frame. For file writers the destination size is taken after the
//!   call. Shape and memory describe the wrapped frame after the call, even
//!   when the operation returned a separate result.

use crate::error::TimingError;
use crate::frame::Frame;
use crate::measurement::Measurement;
use crate::memory::memory_breakdown;
use crate::operation::OperationArgs;
use crate::operation::OperationName;
use crate::operation::OperationOutput;
use crate::operation::OperationRegistry;
use crate::store::ResultStore;
use crate::timer::timed;
use std::fs;
use std::path::Path;

/// How a call to [`TimedFrame::time`] is resolved and whether its
/// measurement is persisted.
#[derive(Debug, Clone, Default)]
pub struct TimeOptions {
  pub is_read_operation: bool,
  pub destination: Option<ResultStore>,
  pub truncate: bool,
}

impl TimeOptions {
  pub fn transform() -> Self {
    Self::default()
  }

  pub fn read() -> Self {
    Self {
      is_read_operation: true,
      ..Self::default()
    }
  }

  /// Persists the measurement to `store` once the operation succeeds.
  pub fn persist_to(mut self, store: ResultStore) -> Self {
    self.destination = Some(store);
    self
  }

  /// Clears the results table before inserting.
  pub fn truncate(mut self, truncate: bool) -> Self {
    self.truncate = truncate;
    self
  }
}

/// A frame plus the registry its operations are resolved against.
#[derive(Debug, Clone)]
pub struct TimedFrame {
  frame: Frame,
  registry: OperationRegistry,
}

impl TimedFrame {
  /// Type name recorded as `subject_type_name` in every measurement.
  pub const TYPE_NAME: &'static str = "TimedFrame";

  pub fn new(frame: Frame) -> Self {
    Self::with_registry(frame, OperationRegistry::standard())
  }

  pub fn with_registry(frame: Frame, registry: OperationRegistry) -> Self {
    Self { frame, registry }
  }

  pub fn frame(&self) -> &Frame {
    &self.frame
  }

  pub fn frame_mut(&mut self) -> &mut Frame {
    &mut self.frame
  }

  pub fn into_frame(self) -> Frame {
    self.frame
  }

  /// Runs `operation_name` with `args`, returning its output and the
  /// measurement. Nothing is measured or persisted when the operation fails.
  pub fn time(
    &mut self,
    operation_name: &str,
    args: OperationArgs,
    options: TimeOptions,
  ) -> Result<(OperationOutput, Measurement), TimingError> {
    let mode = if options.is_read_operation { "load" } else { "transform" };
    let name: OperationName = operation_name
      .parse()
      .map_err(|_| TimingError::UnsupportedOperation {
        name: operation_name.to_string(),
        mode,
      })?;

    let (output, measurement) = if options.is_read_operation {
      self.time_load(name, &args)?
    } else {
      self.time_transform(name, &args)?
    };

    tracing::debug!(
      operation = %name,
      shape = %measurement.shape(),
      memory_bytes = measurement.memory_bytes(),
      file_size = ?measurement.file_size_bytes(),
      "{} took {:.5} seconds",
      name,
      measurement.elapsed_seconds()
    );

    if let Some(store) = &options.destination {
      store.save(&measurement, options.truncate)?;
    }

    Ok((output, measurement))
  }

  fn time_load(
    &self,
    name: OperationName,
    args: &OperationArgs,
  ) -> Result<(OperationOutput, Measurement), TimingError> {
    let handler = self
      .registry
      .loader(name)
      .ok_or_else(|| unsupported(name, "load"))?;
    handler
      .check_keywords(name, args)
      .map_err(|source| argument_error(name, source))?;

    let path = args.path_at(0).map_err(|source| argument_error(name, source))?;
    let file_size = file_size(path)?;

    let (result, elapsed) = timed(|| (handler.run)(args));
    let loaded = result.map_err(|source| TimingError::Operation {
      operation: name.as_str(),
      source,
    })?;

    let measurement = Measurement::new(
      name.as_str(),
      Self::TYPE_NAME,
      loaded.shape(),
      memory_breakdown(&loaded),
      elapsed,
      Some(file_size),
    );
    Ok((OperationOutput::Frame(loaded), measurement))
  }

  fn time_transform(
    &mut self,
    name: OperationName,
    args: &OperationArgs,
  ) -> Result<(OperationOutput, Measurement), TimingError> {
    let handler = *self
      .registry
      .transform(name)
      .ok_or_else(|| unsupported(name, "transform"))?;
    handler
      .check_keywords(name, args)
      .map_err(|source| argument_error(name, source))?;

    let (result, elapsed) = timed(|| (handler.run)(&mut self.frame, args));
    let output = result.map_err(|source| TimingError::Operation {
      operation: name.as_str(),
      source,
    })?;

    let file_size = if name.is_file_writer() {
      let path = args.path_at(0).map_err(|source| argument_error(name, source))?;
      Some(file_size(path)?)
    } else {
      None
    };

    let measurement = Measurement::new(
      name.as_str(),
      Self::TYPE_NAME,
      self.frame.shape(),
      memory_breakdown(&self.frame),
      elapsed,
      file_size,
    );
    Ok((output, measurement))
  }
}

fn unsupported(name: OperationName, mode: &'static str) -> TimingError {
  TimingError::UnsupportedOperation {
    name: name.as_str().to_string(),
    mode,
  }
}

fn argument_error(name: OperationName, source: crate::error::ArgumentError) -> TimingError {
  TimingError::Arguments {
    operation: name.as_str(),
    source,
  }
}

fn file_size(path: &Path) -> Result<u64, TimingError> {
  fs::metadata(path)
    .map(|meta| meta.len())
    .map_err(|source| TimingError::FileSize {
      path: path.to_path_buf(),
      source,
    })
}
