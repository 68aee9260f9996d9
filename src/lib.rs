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

//! # framebench
//!
//! `framebench` measures how long a tabular dataset takes to write to and
//! read back from different file formats, how much memory the data occupies
//! and how large the files get, with and without narrowed column types.
//!
//! This crate contains the library behind the `fbench` CLI. The timing core
//! (`timer`, `timed`, `measurement`, `store`) can be used on its own.
//!
//! ## Core Modules
//!
//! * [`frame`]: The in-memory columnar [`frame::Frame`] and its transforms.
//! * [`codec`]: CSV, JSON, pickle (bincode), Parquet and Excel readers/writers.
//! * [`operation`]: The closed set of named operations and the registry
//!   mapping each name to its handler.
//! * [`timer`]: `ScopedTimer`, a monotonic stopwatch with a drop guard.
//! * [`timed`]: `TimedFrame::time`, which runs one operation and produces a
//!   [`measurement::Measurement`].
//! * [`store`]: SQLite persistence for measurements.
//! * [`benchmark`]: The `run_benchmarks` loop over sizes, variants and formats.
//! * [`report`]: The results CSV and Markdown summary.
//! * [`config`]: Layers defaults, config file, environment and `RunArgs`
//!   into a `Config`.
//! * [`cli`]: Defines the `clap`-based command-line interface.
//! * [`error`]: Defines the custom error types for the library.
//! * [`logging`]: Provides the `setup_tracing` utility.

pub mod benchmark;
pub mod cleanup;
pub mod cli;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod logging;
pub mod measurement;
pub mod memory;
pub mod operation;
pub mod report;
pub mod store;
pub mod timed;
pub mod timer;
