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
use crate::codec::FileFormat;
use crate::dataset::DatasetKind;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Benchmarks reading and writing tabular data across file formats")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
  /// Generate datasets, time every write and read, then persist and report.
  Run(RunArgs),

  /// Print measurements stored in a results database.
  Show {
    /// SQLite database written by `run`.
    #[arg(long)]
    database: PathBuf,

    /// Only print the first measurement of this operation (e.g. `to_csv`).
    #[arg(long)]
    method: Option<String>,

    /// Emit JSON instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Delete benchmark artifacts from a directory by extension.
  Clean {
    /// Directory to clean.
    #[arg(long, default_value = "data")]
    dir: PathBuf,

    /// Remove every file regardless of extension.
    #[arg(long)]
    all: bool,

    /// Extensions to remove (e.g. `csv parquet`).
    extensions: Vec<String>,
  },
}

/// Overrides for a benchmark run. Anything left unset falls back to the
/// config file, then `FRAMEBENCH_*` environment variables, then defaults.
#[derive(Debug, Default, Args)]
pub struct RunArgs {
  /// JSON or TOML file with run settings.
  #[arg(long, env = "FRAMEBENCH_CONFIG")]
  pub config: Option<PathBuf>,

  /// Directory for generated files, the database and reports.
  #[arg(long)]
  pub data_dir: Option<PathBuf>,

  /// SQLite database for measurements. Defaults to `<data-dir>/benchmarks.db`.
  #[arg(long, conflicts_with = "no_store")]
  pub database: Option<PathBuf>,

  /// Do not persist measurements.
  #[arg(long)]
  pub no_store: bool,

  /// Dataset row counts, comma separated.
  #[arg(long, value_delimiter = ',')]
  pub sizes: Vec<usize>,

  /// File formats to benchmark, comma separated.
  #[arg(long, value_delimiter = ',', value_enum)]
  pub formats: Vec<FileFormat>,

  /// Synthetic dataset to generate.
  #[arg(long, value_enum)]
  pub dataset: Option<DatasetKind>,

  /// Seed for dataset generation.
  #[arg(long)]
  pub seed: Option<u64>,

  /// Keep measurements from earlier runs instead of clearing the table.
  #[arg(long)]
  pub keep_store: bool,

  /// Skip writing the results CSV and Markdown report.
  #[arg(long)]
  pub no_report: bool,

  /// Leave generated dataset files in the data directory.
  #[arg(long)]
  pub keep_artifacts: bool,
}
