//! Directory-level merge: discover `*.json` files, fold them through
//! [`deep_merge`](crate::deep_merge) and write the result.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use serde_json::{Map, Value};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use crate::deep_merge::merge_into;

/// Everything [`run`] needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Directory scanned recursively for `*.json`
    pub input_dir: PathBuf,
    /// Directory the merged file is written into (created if missing)
    pub output_dir: PathBuf,
    /// File name of the merged document inside `output_dir`
    pub output_filename: String,
    /// Merge in lexicographic path order instead of walk order
    pub sort_paths: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./input"),
            output_dir: PathBuf::from("./output"),
            output_filename: "merged.json".to_string(),
            sort_paths: false,
        }
    }
}

impl MergeConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_filename)
    }
}

/// Conditions that abort the whole batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input directory {} does not exist", .0.display())]
    InputNotFound(PathBuf),

    #[error("no JSON files found in {}", .0.display())]
    NoInputFiles(PathBuf),

    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateOutputDir { path: PathBuf, source: io::Error },

    #[error("cannot serialize merged document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("cannot write {}: {source}", .path.display())]
    WriteOutput { path: PathBuf, source: io::Error },
}

/// Why a single input file was left out of the merge.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot read file: {0}")]
    Read(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug)]
pub struct SkippedFile {
    /// Path relative to the input directory
    pub path: PathBuf,
    pub error: FileError,
}

/// Outcome of a successful [`run`].
#[derive(Debug)]
pub struct MergeReport {
    pub discovered: usize,
    pub merged: usize,
    pub skipped: Vec<SkippedFile>,
    pub output_path: PathBuf,
}

/// Merge every JSON file under `config.input_dir` into one document.
///
/// Unreadable or malformed files are logged and skipped. Anything else that
/// goes wrong aborts with a [`BatchError`]; in that case no output file is
/// written.
pub fn run(config: &MergeConfig) -> Result<MergeReport, BatchError> {
    if !config.input_dir.is_dir() {
        return Err(BatchError::InputNotFound(config.input_dir.clone()));
    }

    fs::create_dir_all(&config.output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: config.output_dir.clone(),
        source,
    })?;

    let files = discover_json_files(&config.input_dir, config.sort_paths);
    if files.is_empty() {
        return Err(BatchError::NoInputFiles(config.input_dir.clone()));
    }
    info!("Found {} JSON files to merge", files.len());

    let mut merged_data = Value::Object(Map::new());
    let mut merged = 0usize;
    let mut skipped = Vec::new();

    for rel in &files {
        match load_json(&config.input_dir.join(rel)) {
            Ok(doc) => {
                if !doc.is_object() {
                    warn!(
                        "{}: top-level value is not an object, nothing to merge",
                        rel.display()
                    );
                }
                merge_into(&mut merged_data, doc);
                merged += 1;
                info!("Merged: {}", rel.display());
            }
            Err(error) => {
                warn!("Error processing file {}: {error}", rel.display());
                skipped.push(SkippedFile {
                    path: rel.clone(),
                    error,
                });
            }
        }
    }

    let output_path = config.output_path();
    write_pretty(&output_path, &merged_data)?;

    Ok(MergeReport {
        discovered: files.len(),
        merged,
        skipped,
        output_path,
    })
}

/// Paths (relative to `root`) of all `*.json` files below `root`.
///
/// Hidden files and directories are skipped. Entries the walk cannot read
/// are logged and ignored.
pub fn discover_json_files(root: &Path, sort: bool) -> Vec<PathBuf> {
    let mut found = Vec::new();

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if entry.file_type().is_dir() || entry.path().extension() != Some(OsStr::new("json")) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        debug!("Discovered {}", rel.display());
        found.push(rel);
    }

    if sort {
        found.sort();
    }
    found
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Read and parse one JSON document.
pub fn load_json(path: &Path) -> Result<Value, FileError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write `value` as 2-space indented JSON, replacing whatever is at `path`.
pub fn write_pretty(path: &Path, value: &Value) -> Result<(), BatchError> {
    let pretty = serde_json::to_string_pretty(value)?;
    fs::write(path, pretty).map_err(|source| BatchError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config_matches_cli_defaults() {
        let config = MergeConfig::default();
        assert_eq!(config.input_dir, PathBuf::from("./input"));
        assert_eq!(config.output_path(), PathBuf::from("./output/merged.json"));
        assert!(!config.sort_paths);
    }

    #[test]
    fn discovery_is_recursive_and_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::create_dir_all(root.join("dir.json")).unwrap();
        fs::write(root.join("b.json"), "{}").unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "{}").unwrap();
        fs::write(root.join("upper.JSON"), "{}").unwrap();
        fs::write(root.join(".dot.json"), "{}").unwrap();
        fs::write(root.join(".hidden/x.json"), "{}").unwrap();
        fs::write(root.join("nested/deeper/c.json"), "{}").unwrap();

        let files = discover_json_files(root, true);
        assert_eq!(
            files,
            vec![
                PathBuf::from("a.json"),
                PathBuf::from("b.json"),
                PathBuf::from("nested/deeper/c.json"),
            ]
        );
    }

    #[test]
    fn discovery_of_empty_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_json_files(dir.path(), false).is_empty());
    }

    #[test]
    fn load_json_classifies_failures() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();

        assert!(matches!(load_json(&bad), Err(FileError::Parse(_))));
        assert!(matches!(
            load_json(&dir.path().join("missing.json")),
            Err(FileError::Read(_))
        ));
    }

    #[test]
    fn write_pretty_uses_two_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_pretty(&path, &json!({"a": {"b": 1}})).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"a\": {\n    \"b\": 1\n  }\n}"
        );
    }
}
