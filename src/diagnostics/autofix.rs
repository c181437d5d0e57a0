//! Turn diagnostic records into verified edits.
//!
//! Indentation findings become leading-space replacements guarded by the
//! `found` count; canonical-class findings become span replacements guarded by
//! the old class text.

use crate::diagnostics::payload::Payload;
use crate::diagnostics::record::DiagnosticRecord;
use crate::edit::Edit;
use crate::path::{normalize, resolve};
use std::path::Path;

/// Result of attempting to auto-fix a diagnostic.
#[derive(Debug)]
pub enum AutofixResult {
    /// Successfully generated a fix
    Fixed(Edit),
    /// Cannot auto-fix this diagnostic
    CannotFix { reason: String },
}

/// Attempt to build an edit for a diagnostic record.
///
/// `base` is the directory relative resources are resolved against.
#[must_use]
pub fn try_autofix(record: &DiagnosticRecord, base: &Path) -> AutofixResult {
    let file = resolve(base, &normalize(&record.file_path));

    let edit = match &record.payload {
        Payload::Indentation { expected, found } => {
            Edit::reindent(file, record.line, *expected, *found)
        }
        Payload::Rewrite { old, new } => Edit::new(
            file,
            record.line,
            record.column_start.saturating_sub(1),
            record.column_end.saturating_sub(1),
            new.clone(),
            old,
        ),
    };

    match edit {
        Ok(edit) => AutofixResult::Fixed(edit),
        Err(e) => AutofixResult::CannotFix {
            reason: e.to_string(),
        },
    }
}
