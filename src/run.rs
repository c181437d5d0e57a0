//! Run coordinator: load diagnostics, build edits, apply them file by file.

use crate::apply::{apply_file, ApplyOptions, ApplyResult};
use crate::config::KindRule;
use crate::diagnostics::{
    build_edits, load_diagnostics, parse_entries, DiagnosticKind, DiagnosticsError,
    MalformedEntry, ParseWarning, RawDiagnostic, Unfixable,
};
use crate::group::{group_edits, FileEditGroup};
use crate::safety::WorkspaceGuard;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot load diagnostics from {path}: {source}")]
    DiagnosticsLoad {
        path: PathBuf,
        #[source]
        source: DiagnosticsError,
    },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Base directory for relative resources
    pub root: PathBuf,
    /// Classification rules for entries without an explicit kind
    pub rules: Vec<KindRule>,
    /// Only fix these kinds (all when `None`)
    pub kinds: Option<Vec<DiagnosticKind>>,
    pub dry_run: bool,
    pub capture_preview: bool,
    /// Apply files concurrently on the rayon pool
    pub parallel: bool,
    pub guard: Option<WorkspaceGuard>,
}

impl RunOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            rules: KindRule::defaults(),
            kinds: None,
            dry_run: false,
            capture_preview: false,
            parallel: false,
            guard: None,
        }
    }

    fn wants(&self, kind: DiagnosticKind) -> bool {
        self.kinds.as_ref().map_or(true, |kinds| kinds.contains(&kind))
    }

    fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            dry_run: self.dry_run,
            capture_preview: self.capture_preview,
            guard: self.guard.clone(),
        }
    }
}

/// Everything a run did, returned by value.
#[derive(Debug, Default)]
#[must_use = "RunSummary carries per-file failures and skipped edits"]
pub struct RunSummary {
    pub entries_total: usize,
    /// Document elements that are not diagnostic objects
    pub malformed: Vec<MalformedEntry>,
    /// Entries of no recognized (or selected) kind
    pub entries_ignored: usize,
    pub warnings: Vec<ParseWarning>,
    pub unfixable: Vec<Unfixable>,
    /// One result per file, in first-seen order
    pub results: Vec<ApplyResult>,
}

impl RunSummary {
    pub fn files_considered(&self) -> usize {
        self.results.len()
    }

    pub fn files_modified(&self) -> usize {
        self.results.iter().filter(|r| r.modified).count()
    }

    pub fn files_failed(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn edits_applied(&self) -> usize {
        self.results.iter().map(|r| r.edits_applied).sum()
    }

    pub fn edits_skipped(&self) -> usize {
        self.results.iter().map(|r| r.skipped.len()).sum()
    }
}

/// Load the diagnostics document at `source` and fix what it reports.
pub fn run(source: &Path, options: &RunOptions) -> Result<RunSummary, RunError> {
    let document = load_diagnostics(source).map_err(|source_err| RunError::DiagnosticsLoad {
        path: source.to_path_buf(),
        source: source_err,
    })?;
    info!(
        path = %source.display(),
        entries = document.len(),
        malformed = document.malformed.len(),
        "loaded diagnostics"
    );

    let mut summary = run_entries(&document.entries, options);
    for warning in &mut summary.warnings {
        warning.index = document.position(warning.index);
    }
    summary.entries_total = document.len();
    summary.malformed = document.malformed;
    Ok(summary)
}

/// Fix already-loaded diagnostic entries.
pub fn run_entries(entries: &[RawDiagnostic], options: &RunOptions) -> RunSummary {
    let mut parsed = parse_entries(entries, &options.rules);

    let before = parsed.records.len() + parsed.warnings.len();
    parsed.records.retain(|record| options.wants(record.kind));
    parsed.warnings.retain(|warning| options.wants(warning.kind));
    let filtered_out = before - parsed.records.len() - parsed.warnings.len();

    let (edits, unfixable) = build_edits(&parsed.records, &options.root);
    let groups = group_edits(edits);
    let results = apply_groups(&groups, options);

    RunSummary {
        entries_total: entries.len(),
        malformed: Vec::new(),
        entries_ignored: parsed.ignored + filtered_out,
        warnings: parsed.warnings,
        unfixable,
        results,
    }
}

fn apply_groups(groups: &[FileEditGroup], options: &RunOptions) -> Vec<ApplyResult> {
    let apply_options = options.apply_options();
    if options.parallel {
        // One group per file, so no two tasks touch the same path.
        groups
            .par_iter()
            .map(|group| apply_file(group, &apply_options))
            .collect()
    } else {
        groups
            .iter()
            .map(|group| apply_file(group, &apply_options))
            .collect()
    }
}
