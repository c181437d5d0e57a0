//! Diagnostic kinds and their message matchers.
//!
//! Each recognized kind owns one message pattern; the payload extracted from
//! the message is everything the autofix step needs to build an edit.

use crate::edit::MAX_INDENT;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

static INDENTATION_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Expected indentation of (\d+) spaces? but found (\d+)\.")
        .expect("indentation pattern is valid")
});

static REWRITE_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`([^`]+)`\s+(?:can be written as|→)\s+`([^`]+)`")
        .expect("rewrite pattern is valid")
});

/// Diagnostic kinds the patcher knows how to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// ESLint `indent`: wrong number of leading spaces
    IndentationMismatch,
    /// Tailwind `suggestCanonicalClasses`: a class with a canonical spelling
    CanonicalRewrite,
}

impl DiagnosticKind {
    pub const ALL: [DiagnosticKind; 2] = [
        DiagnosticKind::IndentationMismatch,
        DiagnosticKind::CanonicalRewrite,
    ];

    pub fn id(self) -> &'static str {
        match self {
            DiagnosticKind::IndentationMismatch => "indentation-mismatch",
            DiagnosticKind::CanonicalRewrite => "canonical-rewrite",
        }
    }

    /// Extract this kind's payload from a diagnostic message.
    pub fn parse_payload(self, message: &str) -> Option<Payload> {
        match self {
            DiagnosticKind::IndentationMismatch => parse_indentation_message(message)
                .map(|(expected, found)| Payload::Indentation { expected, found }),
            DiagnosticKind::CanonicalRewrite => {
                parse_rewrite_message(message).map(|(old, new)| Payload::Rewrite { old, new })
            }
        }
    }

    /// Shape the message must have, for warnings.
    pub fn expected_shape(self) -> &'static str {
        match self {
            DiagnosticKind::IndentationMismatch => {
                "Expected indentation of N spaces but found M."
            }
            DiagnosticKind::CanonicalRewrite => "`old` can be written as `new`",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown diagnostic kind '{}' (expected one of: indentation-mismatch, canonical-rewrite)",
            self.0
        )
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for DiagnosticKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiagnosticKind::ALL
            .into_iter()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Kind-specific data pulled out of a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Indentation { expected: usize, found: usize },
    Rewrite { old: String, new: String },
}

impl Payload {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Payload::Indentation { .. } => DiagnosticKind::IndentationMismatch,
            Payload::Rewrite { .. } => DiagnosticKind::CanonicalRewrite,
        }
    }
}

/// Parse an ESLint indentation message.
///
/// Example: "Expected indentation of 4 spaces but found 6."
///
/// Widths above [`MAX_INDENT`] are rejected.
pub fn parse_indentation_message(message: &str) -> Option<(usize, usize)> {
    let caps = INDENTATION_MESSAGE.captures(message)?;
    let expected: usize = caps[1].parse().ok()?;
    let found: usize = caps[2].parse().ok()?;
    (expected <= MAX_INDENT && found <= MAX_INDENT).then_some((expected, found))
}

/// Parse a canonical-class message into `(old, new)`.
///
/// Example: "The class `bg-[#fff]` can be written as `bg-white`"
pub fn parse_rewrite_message(message: &str) -> Option<(String, String)> {
    let caps = REWRITE_MESSAGE.captures(message)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}
