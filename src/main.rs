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
use Commands::Clean;
use Commands::Run;
use Commands::Show;
use anyhow::Result;
use clap::Parser;
use framebench::benchmark::run_benchmarks;
use framebench::cleanup::cleanup;
use framebench::cli::Cli;
use framebench::cli::Commands;
use framebench::config::Config;
use framebench::error::FrameBenchError;
use framebench::logging::setup_tracing;
use framebench::report::REPORT_MARKDOWN;
use framebench::report::RESULTS_CSV;
use framebench::report::export_markdown;
use framebench::report::write_results_csv;
use framebench::store::ResultStore;
use std::path::Path;

fn main() -> Result<()> {
  let _log_guard = setup_tracing()?;

  let Cli { command } = Cli::parse();
  let main_span = tracing::info_span!("framebench");
  let _enter = main_span.enter();

  match command {
    Run(run_args) => {
      tracing::info!("Initializing Benchmark Run...");

      let config = Config::try_from(run_args)?;
      tracing::info!(seed = config.seed, data_dir = %config.data_dir.display(), "Resolved configuration");

      let rows = run_benchmarks(&config)?;

      // Runs before the report so `results.csv` survives the csv sweep.
      if config.cleanup_artifacts {
        let extensions: Vec<String> = config
          .formats
          .iter()
          .map(|format| format.extension().to_string())
          .collect();
        cleanup(&config.data_dir, &extensions, false)?;
      }

      if config.report {
        let csv_path = config.data_dir.join(RESULTS_CSV);
        write_results_csv(&rows, &csv_path).map_err(|source| FrameBenchError::Report {
          path: csv_path.clone(),
          source,
        })?;

        let md_path = config.data_dir.join(REPORT_MARKDOWN);
        export_markdown(&rows, &md_path).map_err(|source| FrameBenchError::Report {
          path: md_path.clone(),
          source,
        })?;

        tracing::info!(csv = %csv_path.display(), markdown = %md_path.display(), "Reports written");
      }

      tracing::info!("Benchmark Run Complete.");
    }
    Show {
      database,
      method,
      json,
    } => show(&database, method.as_deref(), json)?,
    Clean {
      dir,
      all,
      extensions,
    } => {
      if !all && extensions.is_empty() {
        tracing::warn!("No extensions given and --all not set. Nothing to clean.");
      } else {
        let removed = cleanup(&dir, &extensions, all)?;
        println!("Removed {} file(s) from {}", removed, dir.display());
      }
    }
  }

  Ok(())
}

fn show(database: &Path, method: Option<&str>, json: bool) -> Result<()> {
  if !database.exists() {
    anyhow::bail!("Result database not found: {}", database.display());
  }
  let store = ResultStore::new(database);

  let records = match method {
    Some(name) => store.find(name)?.into_iter().collect(),
    None => store.load_all()?,
  };

  if records.is_empty() {
    tracing::warn!(path = %database.display(), "No measurements found");
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&records)?);
  } else {
    for record in &records {
      println!("{}\n", record);
    }
  }
  Ok(())
}
