//! Atomic writes: content is staged in a temporary file in the destination
//! directory and renamed over the target only on [`Staged::commit`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// A fully written temporary file waiting to replace `target`. Dropping it
/// without committing removes it.
#[derive(Debug)]
pub struct Staged {
    file: NamedTempFile,
    target: PathBuf,
}

impl Staged {
    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn commit(self) -> Result<()> {
        let Self { file, target } = self;
        file.persist(&target)
            .map_err(|e| PipelineError::io(&target, e.error))?;
        debug!(path = %target.display(), "committed");
        Ok(())
    }
}

/// Stages `df` as CSV with a header row.
pub fn stage_snapshot(df: &mut DataFrame, path: &Path) -> Result<Staged> {
    let mut file = staging_file(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| PipelineError::Write {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    staged(file, path)
}

/// Stages `value` as pretty-printed JSON.
pub fn stage_json<T: Serialize>(value: &T, path: &Path) -> Result<Staged> {
    let mut file = staging_file(path)?;
    serde_json::to_writer_pretty(&mut file, value).map_err(|e| PipelineError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    file.write_all(b"\n")
        .map_err(|e| PipelineError::io(path, e))?;
    staged(file, path)
}

fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    NamedTempFile::new_in(dir).map_err(|e| PipelineError::io(dir, e))
}

fn staged(mut file: NamedTempFile, path: &Path) -> Result<Staged> {
    file.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(Staged {
        file,
        target: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn replaces_existing_file_and_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("final.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale").unwrap();

        let mut df = df! { "Country_Code" => ["USA"], "GDP" => [Some(1.5)] }.unwrap();
        let staged = stage_snapshot(&mut df, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "stale");
        staged.commit().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Country_Code,GDP\nUSA,1.5\n");
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("report.json");
        stage_json(&serde_json::json!({ "rows": 3 }), &path)
            .unwrap()
            .commit()
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"rows\": 3\n}\n");
    }

    #[test]
    fn dropping_a_staged_file_leaves_the_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.report.json");
        fs::write(&path, "previous").unwrap();

        let staged = stage_json(&serde_json::json!({ "rows": 1 }), &path).unwrap();
        assert_eq!(staged.target(), path.as_path());
        drop(staged);

        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
