use crate::buffer::{byte_offset, leading_spaces, LineBuffer};
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// Widest indentation a reindent edit may produce or replace.
pub const MAX_INDENT: usize = 1024;

/// The fundamental edit primitive: a verified replacement of a column span on one line.
///
/// Every diagnostic kind compiles down to this single primitive. Intelligence lives
/// in turning diagnostic messages into spans, not in application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use = "Edit does nothing until it is grouped and applied"]
pub struct Edit {
    /// Canonical path of the file to edit
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Starting character column (0-based, inclusive)
    pub column_start: usize,
    /// Ending character column (0-based, exclusive)
    pub column_end: usize,
    /// New text for [column_start, column_end)
    pub new_text: String,
    /// What we expect to find before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EditVerification {
    /// Exact span text match required
    ExactMatch(String),
    /// xxh3 hash of expected span text (for large spans)
    Hash(u64),
    /// The whole line must start with exactly this many spaces
    LeadingSpaces(usize),
    /// Apply without checking
    Unchecked,
}

impl EditVerification {
    /// Check the current line and span text against the verification criteria.
    pub fn matches(&self, line: &str, span: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => span == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(span.as_bytes()) == *expected_hash,
            EditVerification::LeadingSpaces(count) => leading_spaces(line) == *count,
            EditVerification::Unchecked => true,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }

    fn describe(&self) -> String {
        match self {
            EditVerification::ExactMatch(text) => format!("{text:?}"),
            EditVerification::Hash(hash) => format!("text with xxh3 {hash:016x}"),
            EditVerification::LeadingSpaces(count) => format!("{count} leading spaces"),
            EditVerification::Unchecked => "anything".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("line numbers are 1-based, got 0")]
    ZeroLine,

    #[error("inverted column span [{column_start}, {column_end}) on line {line}")]
    InvertedSpan {
        line: usize,
        column_start: usize,
        column_end: usize,
    },

    #[error("line {line} is out of range (file has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("columns [{column_start}, {column_end}) exceed line {line} of length {line_len}")]
    ColumnOutOfRange {
        line: usize,
        column_start: usize,
        column_end: usize,
        line_len: usize,
    },

    #[error("stale edit at {line}:{column_start}: expected {expected}, found {found:?}")]
    StaleEditMismatch {
        line: usize,
        column_start: usize,
        expected: String,
        found: String,
    },

    #[error("indentation of {width} spaces on line {line} exceeds {}", MAX_INDENT)]
    IndentTooWide { line: usize, width: usize },

    #[error("span [{column_start}, {column_end}) overlaps an edit already applied on line {line}")]
    OverlappingSpan {
        line: usize,
        column_start: usize,
        column_end: usize,
    },
}

impl EditError {
    /// True when the file has diverged from what the diagnostic observed.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            EditError::StaleEditMismatch { .. } | EditError::OverlappingSpan { .. }
        )
    }
}

/// Span of a validated edit within its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedSpan {
    pub bytes: Range<usize>,
    pub already_applied: bool,
}

impl Edit {
    /// Create a new edit with automatic verification generation.
    pub fn new(
        file: impl Into<PathBuf>,
        line: usize,
        column_start: usize,
        column_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Result<Self, EditError> {
        let verification = EditVerification::from_text(expected_before.as_ref());
        Self::with_verification(file, line, column_start, column_end, new_text, verification)
    }

    /// Create an edit with explicit verification strategy.
    pub fn with_verification(
        file: impl Into<PathBuf>,
        line: usize,
        column_start: usize,
        column_end: usize,
        new_text: impl Into<String>,
        verification: EditVerification,
    ) -> Result<Self, EditError> {
        if line == 0 {
            return Err(EditError::ZeroLine);
        }
        if column_start > column_end {
            return Err(EditError::InvertedSpan {
                line,
                column_start,
                column_end,
            });
        }

        Ok(Self {
            file: file.into(),
            line,
            column_start,
            column_end,
            new_text: new_text.into(),
            expected_before: verification,
        })
    }

    /// Replace `found` leading spaces with `expected` spaces.
    ///
    /// Only applies while the line still starts with exactly `found` spaces.
    pub fn reindent(
        file: impl Into<PathBuf>,
        line: usize,
        expected: usize,
        found: usize,
    ) -> Result<Self, EditError> {
        let width = expected.max(found);
        if width > MAX_INDENT {
            return Err(EditError::IndentTooWide { line, width });
        }
        Self::with_verification(
            file,
            line,
            0,
            found,
            " ".repeat(expected),
            EditVerification::LeadingSpaces(found),
        )
    }

    /// Validate the edit against the current buffer contents.
    ///
    /// Returns the byte range of the span within its line if validation succeeds.
    pub(crate) fn validate(&self, buffer: &LineBuffer) -> Result<ValidatedSpan, EditError> {
        let content = buffer.line(self.line).ok_or(EditError::LineOutOfRange {
            line: self.line,
            line_count: buffer.len(),
        })?;

        let (Some(start), Some(end)) = (
            byte_offset(content, self.column_start),
            byte_offset(content, self.column_end),
        ) else {
            return Err(EditError::ColumnOutOfRange {
                line: self.line,
                column_start: self.column_start,
                column_end: self.column_end,
                line_len: content.chars().count(),
            });
        };

        let current = &content[start..end];

        // Check if already applied (idempotency)
        if current == self.new_text {
            return Ok(ValidatedSpan {
                bytes: start..end,
                already_applied: true,
            });
        }

        if !self.expected_before.matches(content, current) {
            return Err(EditError::StaleEditMismatch {
                line: self.line,
                column_start: self.column_start,
                expected: self.expected_before.describe(),
                found: current.to_string(),
            });
        }

        Ok(ValidatedSpan {
            bytes: start..end,
            already_applied: false,
        })
    }

    /// Replace a span returned by [`Edit::validate`] with the edit's new text.
    pub(crate) fn splice(
        &self,
        buffer: &mut LineBuffer,
        span: ValidatedSpan,
    ) -> Result<(), EditError> {
        let line_count = buffer.len();
        let content = buffer.line_mut(self.line).ok_or(EditError::LineOutOfRange {
            line: self.line,
            line_count,
        })?;
        if content.get(span.bytes.clone()).is_none() {
            return Err(EditError::ColumnOutOfRange {
                line: self.line,
                column_start: self.column_start,
                column_end: self.column_end,
                line_len: content.chars().count(),
            });
        }
        content.replace_range(span.bytes, &self.new_text);
        Ok(())
    }
}
