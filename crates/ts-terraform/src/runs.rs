//! Run directories under `./terraform`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use ts_dsl::DslDocument;

use crate::error::{RenderError, RenderResult};

/// Parent directory of generated runs, relative to the working directory.
pub const RUNS_DIR: &str = "terraform";

/// Copy of the validated document kept in each run directory.
pub const DSL_FILE: &str = "dsl.json";

/// `<root>/terraform/<YYYYmmdd_HHMMSS>` for the given instant.
pub fn new_run_dir<Tz: TimeZone>(root: &Path, now: DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    root.join(RUNS_DIR)
        .join(now.format("%Y%m%d_%H%M%S").to_string())
}

/// Most recently modified run directory under `<root>/terraform`.
pub fn latest_run_dir(root: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root.join(RUNS_DIR)).ok()?;
    entries
        .filter_map(Result::ok)
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|e| {
            let modified = e.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, e.path()))
        })
        .max()
        .map(|(_, path)| path)
}

/// Load the document a run directory was rendered from.
pub fn read_run_document(dir: &Path) -> RenderResult<DslDocument> {
    let path = dir.join(DSL_FILE);
    let raw = std::fs::read_to_string(&path).map_err(|e| RenderError::io(&path, e))?;
    serde_json::from_str(&raw).map_err(|e| RenderError::RunDocument {
        path,
        message: e.to_string(),
    })
}
