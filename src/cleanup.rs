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
use crate::error::FrameBenchError;
use std::fs;
use std::io;
use std::path::Path;

/// Deletes one file. Returns `false` when it was already gone.
fn remove_artifact(path: &Path) -> io::Result<bool> {
  match fs::remove_file(path) {
    Ok(()) => {
      tracing::debug!(path = %path.display(), "Removed file");
      Ok(true)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      tracing::warn!(path = %path.display(), error = %e, "File vanished before removal. Skipping.");
      Ok(false)
    }
    Err(e) => Err(e),
  }
}

/// Removes files in `dir` whose name ends in one of `extensions` (given with
/// or without the leading dot), or every file when `all` is set.
///
/// Subdirectories are left alone. Returns how many files were removed.
pub fn cleanup(dir: &Path, extensions: &[String], all: bool) -> Result<usize, FrameBenchError> {
  let wrap = |source: io::Error| FrameBenchError::Cleanup {
    dir: dir.to_path_buf(),
    source,
  };

  let suffixes: Vec<String> = extensions
    .iter()
    .map(|ext| format!(".{}", ext.trim_start_matches('.')))
    .collect();

  let mut removed = 0;
  for entry in fs::read_dir(dir).map_err(wrap)? {
    let path = entry.map_err(wrap)?.path();
    if !path.is_file() {
      continue;
    }

    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default();
    if !all && !suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
      continue;
    }

    if remove_artifact(&path).map_err(wrap)? {
      removed += 1;
    }
  }

  tracing::info!(dir = %dir.display(), removed, "Cleanup complete");
  Ok(removed)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn missing_artifact_is_skipped() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("dataset_10.csv");
    assert!(!remove_artifact(&path).unwrap());

    fs::write(&path, "a\n1\n").unwrap();
    assert!(remove_artifact(&path).unwrap());
    assert!(!path.exists());
  }

  #[test]
  fn directory_removal_error_propagates() {
    let temp = tempdir().unwrap();
    assert!(remove_artifact(temp.path()).is_err());
  }

  #[test]
  fn cleanup_matches_suffixes_and_skips_directories() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join("nested.csv")).unwrap();
    fs::write(temp.path().join("a.csv"), "").unwrap();
    fs::write(temp.path().join("b.tar.gz"), "").unwrap();
    fs::write(temp.path().join("c.txt"), "").unwrap();

    let removed = cleanup(temp.path(), &["csv".to_string(), ".tar.gz".to_string()], false).unwrap();
    assert_eq!(removed, 2);
    assert!(temp.path().join("nested.csv").is_dir());
    assert!(temp.path().join("c.txt").exists());
  }
}
