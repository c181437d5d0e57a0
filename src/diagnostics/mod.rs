//! Diagnostics integration: load an editor problems export and turn its
//! entries into verified edits.
//!
//! 1. Load the JSON array of problems exported by the editor
//! 2. Classify each entry by kind (explicit `kind` field or configured rules)
//! 3. Parse kind-specific payloads out of the messages
//! 4. Build one [`Edit`] per record
//!
//! # Example
//!
//! ```no_run
//! use diag_patcher::config::KindRule;
//! use diag_patcher::diagnostics::{build_edits, load_diagnostics, parse_entries};
//! use std::path::Path;
//!
//! let document = load_diagnostics(Path::new("problems.json")).unwrap();
//! let outcome = parse_entries(&document.entries, &KindRule::defaults());
//!
//! for warning in &outcome.warnings {
//!     println!("skipped: {}", warning);
//! }
//!
//! let (edits, unfixable) = build_edits(&outcome.records, Path::new("."));
//! ```

pub mod autofix;
pub mod entry;
pub mod payload;
pub mod record;

pub use autofix::{try_autofix, AutofixResult};
pub use entry::{CodeValue, DiagnosticCode, RawDiagnostic};
pub use payload::{DiagnosticKind, Payload, UnknownKind};
pub use record::{DiagnosticRecord, EntryProblem};

use crate::config::KindRule;
use crate::edit::Edit;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum DiagnosticsError {
    #[error("diagnostics file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a JSON array of diagnostics: {0}")]
    Json(#[from] serde_json::Error),
}

/// A recognized entry that was skipped, with its position in the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entry #{index} ({kind}) at {location}: {problem}")]
pub struct ParseWarning {
    pub index: usize,
    pub kind: DiagnosticKind,
    pub location: String,
    pub problem: EntryProblem,
}

/// Element of the document that is not a diagnostic object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entry #{index} is malformed: {reason}")]
pub struct MalformedEntry {
    pub index: usize,
    pub reason: String,
}

/// A loaded problems export.
///
/// Elements that fail to deserialize are kept aside in `malformed` so that one
/// mistyped entry does not cost the rest of the document.
#[derive(Debug, Default)]
pub struct DiagnosticsDocument {
    pub entries: Vec<RawDiagnostic>,
    /// Document position of each entry in `entries`
    pub positions: Vec<usize>,
    pub malformed: Vec<MalformedEntry>,
}

impl DiagnosticsDocument {
    /// Number of elements in the document, malformed ones included.
    pub fn len(&self) -> usize {
        self.entries.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Document position of `entries[index]`.
    pub fn position(&self, index: usize) -> usize {
        self.positions.get(index).copied().unwrap_or(index)
    }
}

/// Records parsed from a diagnostics document.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<DiagnosticRecord>,
    /// Entries whose kind is not recognized
    pub ignored: usize,
    pub warnings: Vec<ParseWarning>,
}

/// Record that could not be turned into an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unfixable {
    pub file_path: String,
    pub line: usize,
    pub reason: String,
}

/// Load the diagnostics document: a JSON array of problem entries.
pub fn load_diagnostics(path: &Path) -> Result<DiagnosticsDocument, DiagnosticsError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DiagnosticsError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    parse_document(&contents)
}

/// Parse a diagnostics document already in memory.
///
/// Only a document that is not a JSON array is an error; each element is
/// deserialized on its own.
pub fn parse_document(contents: &str) -> Result<DiagnosticsDocument, DiagnosticsError> {
    // Editors on Windows like to write a UTF-8 BOM.
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let elements: Vec<serde_json::Value> = serde_json::from_str(contents)?;

    let mut document = DiagnosticsDocument::default();
    for (index, element) in elements.into_iter().enumerate() {
        match serde_json::from_value::<RawDiagnostic>(element) {
            Ok(entry) => {
                document.entries.push(entry);
                document.positions.push(index);
            }
            Err(e) => {
                let malformed = MalformedEntry {
                    index,
                    reason: e.to_string(),
                };
                warn!("skipping diagnostic: {}", malformed);
                document.malformed.push(malformed);
            }
        }
    }

    Ok(document)
}

/// Determine which kind an entry belongs to, if any.
///
/// An explicit `kind` naming a known kind wins; otherwise the first matching rule.
pub fn classify(entry: &RawDiagnostic, rules: &[KindRule]) -> Option<DiagnosticKind> {
    if let Some(kind) = entry.kind.as_deref().and_then(|k| k.parse().ok()) {
        return Some(kind);
    }
    rules
        .iter()
        .find(|rule| rule.matches(entry))
        .map(|rule| rule.kind)
}

/// Parse raw entries into records.
///
/// Unrecognized kinds are counted and dropped silently; recognized entries that
/// cannot be parsed are dropped with a warning.
pub fn parse_entries(entries: &[RawDiagnostic], rules: &[KindRule]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (index, entry) in entries.iter().enumerate() {
        let Some(kind) = classify(entry, rules) else {
            outcome.ignored += 1;
            continue;
        };

        match DiagnosticRecord::from_entry(entry, kind) {
            Ok(record) => {
                debug!(index, %kind, file = %record.file_path, line = record.line, "parsed diagnostic");
                outcome.records.push(record);
            }
            Err(problem) => {
                let warning = ParseWarning {
                    index,
                    kind,
                    location: format!(
                        "{}:{}",
                        entry.resource.as_deref().unwrap_or("<no resource>"),
                        entry
                            .start_line_number
                            .map_or_else(|| "?".to_string(), |l| l.to_string())
                    ),
                    problem,
                };
                warn!("skipping diagnostic: {}", warning);
                outcome.warnings.push(warning);
            }
        }
    }

    outcome
}

/// Build edits for all records.
///
/// Returns a tuple of (edits, records that could not be fixed).
#[must_use]
pub fn build_edits(records: &[DiagnosticRecord], base: &Path) -> (Vec<Edit>, Vec<Unfixable>) {
    let mut edits = Vec::with_capacity(records.len());
    let mut unfixable = Vec::new();

    for record in records {
        match try_autofix(record, base) {
            AutofixResult::Fixed(edit) => edits.push(edit),
            AutofixResult::CannotFix { reason } => {
                warn!(file = %record.file_path, line = record.line, "cannot fix: {}", reason);
                unfixable.push(Unfixable {
                    file_path: record.file_path.clone(),
                    line: record.line,
                    reason,
                });
            }
        }
    }

    (edits, unfixable)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBLEMS: &str = r#"[
        {
            "resource": "/k:/app/src/App.jsx",
            "owner": "eslint",
            "code": {"value": "indent", "target": {"path": "/docs/rules/indent"}},
            "message": "Expected indentation of 4 spaces but found 6.",
            "startLineNumber": 10, "startColumn": 1, "endLineNumber": 10, "endColumn": 7
        },
        {
            "resource": "/k:/app/src/App.jsx",
            "owner": "eslint",
            "code": {"value": "no-unused-vars"},
            "message": "'x' is defined but never used.",
            "startLineNumber": 2, "startColumn": 7, "endLineNumber": 2, "endColumn": 8
        },
        {
            "resource": "/k:/app/src/App.jsx",
            "owner": "eslint",
            "code": "indent",
            "message": "Expected indentation of 1 tab but found 4 spaces.",
            "startLineNumber": 12
        },
        {
            "resource": "/k:/app/src/Card.tsx",
            "owner": "tailwindcss-intellisense",
            "code": "suggestCanonicalClasses",
            "message": "The class `h-[2px]` can be written as `h-0.5`",
            "startLineNumber": 3, "startColumn": 15, "endLineNumber": 3, "endColumn": 22
        }
    ]"#;

    #[test]
    fn test_parse_document_and_entries() {
        let entries = parse_document(PROBLEMS).unwrap().entries;
        assert_eq!(entries.len(), 4);

        let outcome = parse_entries(&entries, &KindRule::defaults());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.ignored, 1);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].index, 2);
        assert!(matches!(
            outcome.warnings[0].problem,
            EntryProblem::UnparseableMessage { .. }
        ));
        assert_eq!(outcome.records[1].kind, DiagnosticKind::CanonicalRewrite);
    }

    #[test]
    fn test_parse_document_with_bom() {
        let document = parse_document("\u{feff}[]").unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn test_parse_document_rejects_non_array() {
        let result = parse_document(r#"{"problems": []}"#);
        assert!(matches!(result, Err(DiagnosticsError::Json(_))));
    }

    #[test]
    fn test_parse_document_keeps_well_formed_neighbours() {
        let document = parse_document(
            r#"[
                {"resource": "a.js", "code": "semi", "message": null, "startLineNumber": 1},
                {"resource": "a.js", "code": "indent",
                 "message": "Expected indentation of 4 spaces but found 6.", "startLineNumber": 2},
                {"resource": "a.js", "message": "x", "startLineNumber": "3"},
                {"resource": "a.js", "message": "x", "startLineNumber": -1},
                42
            ]"#,
        )
        .unwrap();

        assert_eq!(document.len(), 5);
        assert_eq!(document.entries.len(), 1);
        assert_eq!(document.position(0), 1);
        let indices: Vec<usize> = document.malformed.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_diagnostics(&dir.path().join("problems.json"));
        assert!(matches!(result, Err(DiagnosticsError::NotFound(_))));
    }

    #[test]
    fn test_explicit_kind_wins_over_rules() {
        let entry = RawDiagnostic {
            kind: Some("canonical-rewrite".to_string()),
            code: Some(DiagnosticCode::Text("indent".to_string())),
            ..RawDiagnostic::default()
        };
        assert_eq!(
            classify(&entry, &KindRule::defaults()),
            Some(DiagnosticKind::CanonicalRewrite)
        );
    }

    #[test]
    fn test_rule_owner_filter() {
        let entry = RawDiagnostic {
            owner: Some("some-other-extension".to_string()),
            code: Some(DiagnosticCode::Text("suggestCanonicalClasses".to_string())),
            ..RawDiagnostic::default()
        };
        assert_eq!(classify(&entry, &KindRule::defaults()), None);
    }

    #[test]
    fn test_build_edits_normalizes_paths() {
        let entries = parse_document(PROBLEMS).unwrap().entries;
        let outcome = parse_entries(&entries, &KindRule::defaults());
        let (edits, unfixable) = build_edits(&outcome.records, Path::new("/ignored"));

        assert!(unfixable.is_empty());
        assert_eq!(edits[0].file, PathBuf::from("K:/app/src/App.jsx"));
        assert_eq!(edits[1].file, PathBuf::from("K:/app/src/Card.tsx"));
        assert_eq!((edits[1].column_start, edits[1].column_end), (14, 21));
    }
}
