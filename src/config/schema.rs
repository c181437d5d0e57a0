use crate::diagnostics::{DiagnosticKind, RawDiagnostic};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub fix: FixConfig,
    #[serde(default = "KindRule::defaults")]
    pub rules: Vec<KindRule>,
    #[serde(default)]
    pub crlf: CrlfConfig,
    #[serde(default)]
    pub tree: TreeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fix: FixConfig::default(),
            rules: KindRule::defaults(),
            crlf: CrlfConfig::default(),
            tree: TreeConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.fix.default_diagnostics.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "fix",
                field: "default_diagnostics",
            });
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.code.trim().is_empty() {
                issues.push(ValidationIssue::EmptyRuleCode { index });
            }
        }

        if self.crlf.extensions.is_empty() && self.crlf.file_names.is_empty() {
            issues.push(ValidationIssue::NothingToConvert);
        }

        for pattern in &self.tree.ignore {
            if let Err(e) = globset::Glob::new(pattern) {
                issues.push(ValidationIssue::InvalidGlob {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                });
            }
        }

        if self.tree.output.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                section: "tree",
                field: "output",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FixConfig {
    /// Diagnostics document used when none is given on the command line
    pub default_diagnostics: String,
    /// Directory names the patcher refuses to write into when a root is set
    pub forbidden_dirs: Vec<String>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            default_diagnostics: "problems.json".to_string(),
            forbidden_dirs: vec!["node_modules".to_string(), ".git".to_string()],
        }
    }
}

/// Maps an editor diagnostic code (optionally scoped to an owner/source) to a kind.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct KindRule {
    pub kind: DiagnosticKind,
    pub code: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl KindRule {
    pub fn new(kind: DiagnosticKind, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            owner: None,
            source: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// ESLint `indent` and Tailwind IntelliSense `suggestCanonicalClasses`.
    pub fn defaults() -> Vec<KindRule> {
        vec![
            KindRule::new(DiagnosticKind::IndentationMismatch, "indent"),
            KindRule::new(DiagnosticKind::CanonicalRewrite, "suggestCanonicalClasses")
                .with_owner("tailwindcss-intellisense"),
        ]
    }

    pub fn matches(&self, entry: &RawDiagnostic) -> bool {
        entry.has_code(&self.code)
            && self
                .owner
                .as_deref()
                .map_or(true, |owner| entry.owner.as_deref() == Some(owner))
            && self
                .source
                .as_deref()
                .map_or(true, |source| entry.source.as_deref() == Some(source))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CrlfConfig {
    /// Directory names pruned from the walk
    pub skip_dirs: Vec<String>,
    /// Extensions (without the dot) of files to convert
    pub extensions: Vec<String>,
    /// Exact file names to convert regardless of extension
    pub file_names: Vec<String>,
}

impl Default for CrlfConfig {
    fn default() -> Self {
        Self {
            skip_dirs: strings(&[
                "node_modules",
                ".git",
                "dist",
                "build",
                "coverage",
                "__pycache__",
                ".vscode",
                ".idea",
            ]),
            extensions: strings(&[
                "js", "jsx", "ts", "tsx", "json", "md", "txt", "py", "sh", "bash", "yml", "yaml",
                "css", "scss", "sass", "html", "xml", "env", "sample",
            ]),
            file_names: strings(&[".gitignore", ".eslintrc", ".cursorrules", ".env"]),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TreeConfig {
    /// Glob patterns matched against entry names
    pub ignore: Vec<String>,
    /// Output file, relative to the mapped root
    pub output: String,
    pub title: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            ignore: strings(&[
                "node_modules",
                ".git",
                "__pycache__",
                ".pytest_cache",
                "venv",
                "env",
                ".env",
                "dist",
                "build",
                ".vscode",
                ".idea",
                "*.pyc",
                ".DS_Store",
            ]),
            output: "file_structure.txt".to_string(),
            title: "PROJECT FILE STRUCTURE".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        section: &'static str,
        field: &'static str,
    },
    EmptyRuleCode {
        index: usize,
    },
    NothingToConvert,
    InvalidGlob {
        pattern: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { section, field } => {
                write!(f, "[{section}] missing required field '{field}'")
            }
            ValidationIssue::EmptyRuleCode { index } => {
                write!(f, "rule #{index} has an empty 'code'")
            }
            ValidationIssue::NothingToConvert => {
                write!(f, "[crlf] needs at least one extension or file name")
            }
            ValidationIssue::InvalidGlob { pattern, message } => {
                write!(f, "[tree] invalid ignore pattern '{pattern}': {message}")
            }
        }
    }
}
