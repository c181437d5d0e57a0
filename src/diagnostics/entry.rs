//! Raw entries of an editor problems export.
//!
//! Mirrors the JSON VS Code writes when the Problems panel is copied: one
//! object per finding, 1-based line and column numbers, and a `code` that is
//! either a bare string/number or an object carrying a documentation link.

use serde::Deserialize;
use std::fmt;

/// One finding as exported by the editor.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawDiagnostic {
    /// File identifier as the editor wrote it (may be `/k:/...`)
    #[serde(default, alias = "file")]
    pub resource: Option<String>,
    /// Extension that reported the finding (e.g. `eslint`)
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub code: Option<DiagnosticCode>,
    #[serde(default)]
    pub source: Option<String>,
    /// Explicit kind id, taking precedence over rule matching
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: Option<i64>,
    #[serde(default, alias = "line")]
    pub start_line_number: Option<usize>,
    #[serde(default, alias = "columnStart")]
    pub start_column: Option<usize>,
    #[serde(default)]
    pub end_line_number: Option<usize>,
    #[serde(default, alias = "columnEnd")]
    pub end_column: Option<usize>,
}

/// Diagnostic code in any of the shapes editors emit.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DiagnosticCode {
    Text(String),
    Number(i64),
    /// `{ "value": "indent", "target": { ...documentation uri... } }`
    Linked {
        value: CodeValue,
        #[serde(default)]
        target: Option<serde_json::Value>,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CodeValue {
    Text(String),
    Number(i64),
}

impl DiagnosticCode {
    /// Check whether the code's value equals `expected`.
    pub fn is(&self, expected: &str) -> bool {
        match self {
            DiagnosticCode::Text(text)
            | DiagnosticCode::Linked {
                value: CodeValue::Text(text),
                ..
            } => text == expected,
            DiagnosticCode::Number(n)
            | DiagnosticCode::Linked {
                value: CodeValue::Number(n),
                ..
            } => expected.parse::<i64>().is_ok_and(|e| e == *n),
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCode::Text(text)
            | DiagnosticCode::Linked {
                value: CodeValue::Text(text),
                ..
            } => write!(f, "{text}"),
            DiagnosticCode::Number(n)
            | DiagnosticCode::Linked {
                value: CodeValue::Number(n),
                ..
            } => write!(f, "{n}"),
        }
    }
}

impl RawDiagnostic {
    /// Check the entry's code against `expected`.
    pub fn has_code(&self, expected: &str) -> bool {
        self.code.as_ref().is_some_and(|code| code.is(expected))
    }
}
