use crate::diagnostics::entry::RawDiagnostic;
use crate::diagnostics::payload::{DiagnosticKind, Payload};
use thiserror::Error;

/// A recognized diagnostic with its payload extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// File identifier exactly as supplied
    pub file_path: String,
    /// 1-based line
    pub line: usize,
    /// 1-based start column
    pub column_start: usize,
    /// 1-based end column (exclusive)
    pub column_end: usize,
    pub kind: DiagnosticKind,
    pub payload: Payload,
}

/// Why a recognized entry could not become a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryProblem {
    #[error("message {message:?} does not match \"{shape}\"")]
    UnparseableMessage {
        message: String,
        shape: &'static str,
    },

    #[error("entry has no resource")]
    MissingResource,

    #[error("entry has no start line")]
    MissingLine,

    #[error("entry has no start/end columns")]
    MissingColumns,

    #[error("span crosses lines {start}..{end}")]
    MultiLineSpan { start: usize, end: usize },
}

impl DiagnosticRecord {
    /// Build a record from an entry already classified as `kind`.
    pub fn from_entry(entry: &RawDiagnostic, kind: DiagnosticKind) -> Result<Self, EntryProblem> {
        let file_path = entry
            .resource
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(EntryProblem::MissingResource)?
            .to_string();
        let line = entry.start_line_number.ok_or(EntryProblem::MissingLine)?;

        let payload =
            kind.parse_payload(&entry.message)
                .ok_or_else(|| EntryProblem::UnparseableMessage {
                    message: entry.message.clone(),
                    shape: kind.expected_shape(),
                })?;

        let (column_start, column_end) = match kind {
            // Indentation fixes address the line's leading whitespace, not the reported span.
            DiagnosticKind::IndentationMismatch => (
                entry.start_column.unwrap_or(1),
                entry.end_column.unwrap_or(1),
            ),
            DiagnosticKind::CanonicalRewrite => {
                if let Some(end) = entry.end_line_number.filter(|end| *end != line) {
                    return Err(EntryProblem::MultiLineSpan { start: line, end });
                }
                match (entry.start_column, entry.end_column) {
                    (Some(start), Some(end)) => (start, end),
                    _ => return Err(EntryProblem::MissingColumns),
                }
            }
        };

        Ok(Self {
            file_path,
            line,
            column_start,
            column_end,
            kind,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> RawDiagnostic {
        RawDiagnostic {
            resource: Some("/k:/app/src/a.jsx".to_string()),
            message: message.to_string(),
            start_line_number: Some(10),
            start_column: Some(1),
            end_line_number: Some(10),
            end_column: Some(7),
            ..RawDiagnostic::default()
        }
    }

    #[test]
    fn test_indentation_record() {
        let record = DiagnosticRecord::from_entry(
            &entry("Expected indentation of 4 spaces but found 6."),
            DiagnosticKind::IndentationMismatch,
        )
        .unwrap();

        assert_eq!(record.file_path, "/k:/app/src/a.jsx");
        assert_eq!(record.line, 10);
        assert_eq!(record.payload, Payload::Indentation { expected: 4, found: 6 });
    }

    #[test]
    fn test_unparseable_message() {
        let err = DiagnosticRecord::from_entry(
            &entry("Expected indentation of 1 tab but found 0."),
            DiagnosticKind::IndentationMismatch,
        )
        .unwrap_err();
        assert!(matches!(err, EntryProblem::UnparseableMessage { .. }));
    }

    #[test]
    fn test_rewrite_needs_columns() {
        let mut raw = entry("`p-[4px]` can be written as `p-1`");
        raw.end_column = None;
        let err = DiagnosticRecord::from_entry(&raw, DiagnosticKind::CanonicalRewrite).unwrap_err();
        assert_eq!(err, EntryProblem::MissingColumns);
    }

    #[test]
    fn test_rewrite_rejects_multi_line_span() {
        let mut raw = entry("`p-[4px]` can be written as `p-1`");
        raw.end_line_number = Some(11);
        let err = DiagnosticRecord::from_entry(&raw, DiagnosticKind::CanonicalRewrite).unwrap_err();
        assert_eq!(err, EntryProblem::MultiLineSpan { start: 10, end: 11 });
    }

    #[test]
    fn test_missing_resource() {
        let mut raw = entry("Expected indentation of 4 spaces but found 6.");
        raw.resource = Some("  ".to_string());
        let err =
            DiagnosticRecord::from_entry(&raw, DiagnosticKind::IndentationMismatch).unwrap_err();
        assert_eq!(err, EntryProblem::MissingResource);
    }
}
