//! File patch applier.
//!
//! Applies one file's ordered edits to an in-memory [`LineBuffer`] and writes
//! the result back atomically, only when the content actually changed. Failures
//! are reported on the [`ApplyResult`] rather than propagated, so one bad file
//! never stops a run.

use crate::buffer::LineBuffer;
use crate::edit::{Edit, EditError};
use crate::group::FileEditGroup;
use crate::safety::{SafetyError, WorkspaceGuard};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error(transparent)]
    Guard(#[from] SafetyError),
}

/// Why an edit was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The span already holds the replacement
    AlreadyApplied,
    Rejected(EditError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEdit {
    pub line: usize,
    pub column_start: usize,
    pub reason: SkipReason,
}

impl SkippedEdit {
    pub fn is_stale(&self) -> bool {
        matches!(&self.reason, SkipReason::Rejected(e) if e.is_stale())
    }
}

impl fmt::Display for SkippedEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::AlreadyApplied => {
                write!(f, "{}:{}: already applied", self.line, self.column_start + 1)
            }
            SkipReason::Rejected(e) => write!(f, "{}:{}: {}", self.line, self.column_start + 1, e),
        }
    }
}

/// Before/after text of a patched file, for diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Compute results without writing
    pub dry_run: bool,
    /// Keep before/after text of modified files
    pub capture_preview: bool,
    /// Refuse files outside this guard's root
    pub guard: Option<WorkspaceGuard>,
}

/// Outcome of applying one file's edits.
#[derive(Debug)]
#[must_use = "ApplyResult should be checked for errors and skipped edits"]
pub struct ApplyResult {
    pub file: PathBuf,
    pub edits_attempted: usize,
    pub edits_applied: usize,
    /// Content changed (and was written, unless dry-run)
    pub modified: bool,
    pub skipped: Vec<SkippedEdit>,
    pub error: Option<ApplyError>,
    pub preview: Option<Preview>,
}

impl ApplyResult {
    fn failed(file: PathBuf, edits_attempted: usize, error: ApplyError) -> Self {
        Self {
            file,
            edits_attempted,
            edits_applied: 0,
            modified: false,
            skipped: Vec::new(),
            error: Some(error),
            preview: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-buffer counts from [`apply_to_buffer`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub applied: usize,
    pub skipped: Vec<SkippedEdit>,
}

/// Apply edits, in the given order, to a line buffer.
///
/// Edits are expected in [`crate::group::application_order`]. Each edit is
/// range-checked, checked for overlap with spans already applied on its line,
/// and verified against the current text before it is spliced in.
pub fn apply_to_buffer(buffer: &mut LineBuffer, edits: &[Edit]) -> PatchOutcome {
    let mut outcome = PatchOutcome::default();
    // Lowest start column applied so far, per line.
    let mut applied_from: HashMap<usize, usize> = HashMap::new();

    for edit in edits {
        let skip = |reason| SkippedEdit {
            line: edit.line,
            column_start: edit.column_start,
            reason,
        };

        if let Some(&lowest) = applied_from.get(&edit.line) {
            if edit.column_end > lowest {
                let err = EditError::OverlappingSpan {
                    line: edit.line,
                    column_start: edit.column_start,
                    column_end: edit.column_end,
                };
                warn!(file = %edit.file.display(), "skipping edit: {}", err);
                outcome.skipped.push(skip(SkipReason::Rejected(err)));
                continue;
            }
        }

        let span = match edit.validate(buffer) {
            Ok(span) => span,
            Err(err) => {
                warn!(file = %edit.file.display(), "skipping edit: {}", err);
                outcome.skipped.push(skip(SkipReason::Rejected(err)));
                continue;
            }
        };

        if span.already_applied {
            debug!(file = %edit.file.display(), line = edit.line, "edit already applied");
            outcome.skipped.push(skip(SkipReason::AlreadyApplied));
            continue;
        }

        if let Err(err) = edit.splice(buffer, span) {
            warn!(file = %edit.file.display(), "skipping edit: {}", err);
            outcome.skipped.push(skip(SkipReason::Rejected(err)));
            continue;
        }
        applied_from.insert(edit.line, edit.column_start);
        outcome.applied += 1;
        debug!(
            file = %edit.file.display(),
            line = edit.line,
            column = edit.column_start,
            "applied edit"
        );
    }

    outcome
}

/// Apply one file's edits and write the file back if it changed.
pub fn apply_file(group: &FileEditGroup, options: &ApplyOptions) -> ApplyResult {
    match try_apply_file(group, options) {
        Ok(result) => result,
        Err(error) => {
            warn!("{}", error);
            ApplyResult::failed(group.file.clone(), group.edits.len(), error)
        }
    }
}

fn try_apply_file(group: &FileEditGroup, options: &ApplyOptions) -> Result<ApplyResult, ApplyError> {
    let path = &group.file;

    if !path.exists() {
        return Err(ApplyError::NotFound(path.clone()));
    }

    if let Some(guard) = &options.guard {
        guard.validate_path(path)?;
    }

    let original = fs::read(path).map_err(|source| ApplyError::Io {
        path: path.clone(),
        source,
    })?;
    let text = std::str::from_utf8(&original).map_err(|source| ApplyError::InvalidUtf8 {
        path: path.clone(),
        source,
    })?;

    let mut buffer = LineBuffer::parse(text);
    let outcome = apply_to_buffer(&mut buffer, &group.edits);

    let mut result = ApplyResult {
        file: path.clone(),
        edits_attempted: group.edits.len(),
        edits_applied: outcome.applied,
        modified: false,
        skipped: outcome.skipped,
        error: None,
        preview: None,
    };

    if outcome.applied == 0 {
        return Ok(result);
    }

    let patched = buffer.render();
    if patched == text {
        return Ok(result);
    }

    if !options.dry_run {
        atomic_write(path, patched.as_bytes()).map_err(|source| ApplyError::Io {
            path: path.clone(),
            source,
        })?;
        info!(file = %path.display(), edits = outcome.applied, "patched file");
    }

    result.modified = true;
    if options.capture_preview {
        result.preview = Some(Preview {
            before: text.to_string(),
            after: patched,
        });
    }

    Ok(result)
}

/// Atomic file write: tempfile + fsync + rename.
///
/// The original file's permissions are carried over to the replacement.
pub(crate) fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path).ok().map(|m| m.permissions());

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
