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
use crate::cli::RunArgs;
use crate::codec::FileFormat;
use crate::dataset::DatasetKind;
use crate::error::ConfigError;
use figment::Figment;
use figment::providers::Env;
use figment::providers::Format;
use figment::providers::Json;
use figment::providers::Serialized;
use figment::providers::Toml;
use rand::RngCore;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Prefix of environment variables that override run settings.
pub const ENV_PREFIX: &str = "FRAMEBENCH_";

/// Database file name used when none is configured.
pub const DEFAULT_DATABASE: &str = "benchmarks.db";

/// Generates a random 64-bit seed.
fn generate_seed() -> u64 {
  let mut rng = rand::rng();
  rng.next_u64()
}

/// Settings as layered by figment, before path resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub data_dir: PathBuf,
  pub database: Option<PathBuf>,
  pub store: bool,
  pub sizes: Vec<usize>,
  pub formats: Vec<FileFormat>,
  pub dataset: DatasetKind,
  pub seed: Option<u64>,
  pub fresh_store: bool,
  pub report: bool,
  pub cleanup: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      data_dir: PathBuf::from("data"),
      database: None,
      store: true,
      sizes: vec![1_000, 100_000, 1_000_000, 10_000_000],
      formats: vec![
        FileFormat::Csv,
        FileFormat::Json,
        FileFormat::Pickle,
        FileFormat::Parquet,
      ],
      dataset: DatasetKind::TeamResults,
      seed: None,
      fresh_store: true,
      report: true,
      cleanup: true,
    }
  }
}

/// Fully resolved configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub data_dir: PathBuf,
  pub database: Option<PathBuf>,
  pub sizes: Vec<usize>,
  pub formats: Vec<FileFormat>,
  pub dataset: DatasetKind,
  pub seed: u64,
  pub fresh_store: bool,
  pub report: bool,
  pub cleanup_artifacts: bool,
}

fn config_file(path: &Path) -> Result<Figment, ConfigError> {
  if !path.exists() {
    return Err(ConfigError::FileNotFound(path.to_path_buf()));
  }
  match path.extension().and_then(|ext| ext.to_str()) {
    Some("json") => Ok(Figment::from(Json::file(path))),
    Some("toml") => Ok(Figment::from(Toml::file(path))),
    _ => Err(ConfigError::UnsupportedFile(path.to_path_buf())),
  }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
  if path.is_absolute() { path } else { base.join(path) }
}

impl Config {
  /// Layers defaults, the optional config file and the environment, then
  /// applies CLI overrides. Relative paths are resolved against `base_dir`.
  pub fn resolve(args: RunArgs, base_dir: &Path) -> Result<Self, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));
    if let Some(path) = &args.config {
      figment = figment.merge(config_file(path)?);
    }
    figment = figment.merge(Env::prefixed(ENV_PREFIX));

    let mut settings: Settings = figment.extract().map_err(Box::new)?;

    if let Some(data_dir) = args.data_dir {
      settings.data_dir = data_dir;
    }
    if let Some(database) = args.database {
      settings.database = Some(database);
    }
    if args.no_store {
      settings.store = false;
    }
    if !args.sizes.is_empty() {
      settings.sizes = args.sizes;
    }
    if !args.formats.is_empty() {
      settings.formats = args.formats;
    }
    if let Some(dataset) = args.dataset {
      settings.dataset = dataset;
    }
    if args.seed.is_some() {
      settings.seed = args.seed;
    }
    if args.keep_store {
      settings.fresh_store = false;
    }
    if args.no_report {
      settings.report = false;
    }
    if args.keep_artifacts {
      settings.cleanup = false;
    }

    if settings.sizes.is_empty() {
      return Err(ConfigError::NoSizes);
    }
    if settings.formats.is_empty() {
      return Err(ConfigError::NoFormats);
    }

    let data_dir = resolve(base_dir, settings.data_dir);
    let database = settings.store.then(|| {
      settings
        .database
        .map(|db| resolve(base_dir, db))
        .unwrap_or_else(|| data_dir.join(DEFAULT_DATABASE))
    });

    Ok(Config {
      data_dir,
      database,
      sizes: settings.sizes,
      formats: settings.formats,
      dataset: settings.dataset,
      seed: settings.seed.unwrap_or_else(generate_seed),
      fresh_store: settings.fresh_store,
      report: settings.report,
      cleanup_artifacts: settings.cleanup,
    })
  }
}

impl TryFrom<RunArgs> for Config {
  type Error = ConfigError;

  /// Resolves against the process working directory, read once here.
  fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
    let base_dir = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
    Config::resolve(args, &base_dir)
  }
}
