//! Convert CRLF line endings to LF across a project tree.

use crate::apply::atomic_write;
use crate::config::CrlfConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Counts from one conversion pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrlfSummary {
    pub converted: usize,
    pub already_lf: usize,
    pub errors: usize,
    /// Files that matched the extension/name filters
    pub scanned: usize,
    /// Converted files, relative to the root
    pub converted_paths: Vec<PathBuf>,
}

fn is_skipped_dir(entry: &DirEntry, config: &CrlfConfig) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| config.skip_dirs.iter().any(|d| d == name))
}

fn should_process(path: &Path, config: &CrlfConfig) -> bool {
    let by_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| config.file_names.iter().any(|f| f == name));
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| config.extensions.iter().any(|e| e == ext));
    by_name || by_extension
}

/// Rewrite every matching file under `root` that contains `\r\n`.
///
/// Failures are counted and the walk continues.
pub fn convert_tree(root: &Path, config: &CrlfConfig, dry_run: bool) -> CrlfSummary {
    let mut summary = CrlfSummary::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, config));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("cannot walk {}: {}", root.display(), e);
                summary.errors += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() || !should_process(entry.path(), config) {
            continue;
        }

        summary.scanned += 1;
        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %relative.display(), "cannot read: {}", e);
                summary.errors += 1;
                continue;
            }
        };

        if !content.windows(2).any(|w| w == b"\r\n") {
            debug!(file = %relative.display(), "already LF");
            summary.already_lf += 1;
            continue;
        }

        if !dry_run {
            if let Err(e) = atomic_write(path, &crlf_to_lf(&content)) {
                warn!(file = %relative.display(), "cannot write: {}", e);
                summary.errors += 1;
                continue;
            }
            info!(file = %relative.display(), "converted to LF");
        }

        summary.converted += 1;
        summary.converted_paths.push(relative);
    }

    summary
}

/// Replace every `\r\n` with `\n`. Lone `\r` bytes are kept.
pub fn crlf_to_lf(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len());
    let mut bytes = content.iter().peekable();
    while let Some(&byte) = bytes.next() {
        if byte == b'\r' && bytes.peek() == Some(&&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}
