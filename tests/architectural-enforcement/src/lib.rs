//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No blocking sleeps in production code
//! - The core stays free of terminal UI crates
//! - The view never merges records itself
//!
//! This library holds the source-scanning helpers the tests share.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, resolved from this package's manifest directory
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A source file and the part of it that is not test code
pub struct SourceFile {
    /// Path relative to the workspace root
    pub path: PathBuf,
    /// Content up to the first `#[cfg(test)]`
    pub production: String,
}

impl SourceFile {
    /// Production lines with their 1-based numbers, comments stripped
    pub fn code_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.production.lines().enumerate().filter_map(|(idx, line)| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("//") {
                return None;
            }
            let code = line.split("//").next().unwrap_or(line);
            Some((idx + 1, code))
        })
    }
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = workspace_root();
    let base = root.join(dir);
    if !base.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(&base)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|entry| {
            let content = fs::read_to_string(entry.path()).ok()?;
            let production = match content.find("#[cfg(test)]") {
                Some(pos) => content[..pos].to_string(),
                None => content,
            };
            let path = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .to_path_buf();
            Some(SourceFile { path, production })
        })
        .collect()
}

/// Format a violation for reporting
pub fn violation(file: &SourceFile, line: usize, what: &str) -> String {
    format!("{}:{line}: {what}", file.path.display())
}
