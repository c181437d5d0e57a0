//! End-to-end workflow test
//!
//! Tests the complete library workflow:
//! 1. Load a problems export
//! 2. Build and apply edits
//! 3. Re-run to check idempotency

use diag_patcher::apply::SkipReason;
use diag_patcher::diagnostics::DiagnosticsError;
use diag_patcher::{run, EditError, RunError, RunOptions};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_problems(dir: &Path, json: &str) -> std::path::PathBuf {
    let path = dir.join("problems.json");
    fs::write(&path, json).unwrap();
    path
}

/// A component whose line 10 is over-indented by two spaces
fn setup_component(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("src/App.jsx");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut lines: Vec<String> = (1..=12).map(|n| format!("    line{n}();")).collect();
    lines[9] = "      return <Mission id={1} />;".to_string();
    fs::write(&path, lines.join("\n") + "\n").unwrap();
    path
}

#[test]
fn test_indentation_fix() {
    let dir = TempDir::new().unwrap();
    let file = setup_component(dir.path());
    let problems = write_problems(
        dir.path(),
        r#"[{"file": "src/App.jsx", "kind": "indentation-mismatch",
             "message": "Expected indentation of 4 spaces but found 6.", "line": 10}]"#,
    );
    let before = fs::read_to_string(&file).unwrap();

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.edits_applied(), 1);
    assert_eq!(summary.files_modified(), 1);

    let after = fs::read_to_string(&file).unwrap();
    let after_lines: Vec<&str> = after.lines().collect();
    assert_eq!(after_lines[9], "    return <Mission id={1} />;");

    // Every other line is byte-identical
    for (index, (old, new)) in before.lines().zip(after.lines()).enumerate() {
        if index != 9 {
            assert_eq!(old, new);
        }
    }
}

#[test]
fn test_canonical_rewrite_and_stale_skip() {
    let dir = TempDir::new().unwrap();
    let page = dir.path().join("page.html");
    let other = dir.path().join("other.html");
    let body = "<main>\n  <section>\n<p  old-class>\n</main>\n";
    fs::write(&page, body).unwrap();
    fs::write(&other, body.replace("old-class", "other-text")).unwrap();

    let entry = |file: &str| {
        format!(
            r#"{{"file": "{file}", "kind": "canonical-rewrite",
                "message": "`old-class` can be written as `new-class`",
                "line": 3, "columnStart": 5, "columnEnd": 14}}"#
        )
    };
    let problems = write_problems(
        dir.path(),
        &format!("[{}, {}]", entry("page.html"), entry("other.html")),
    );

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.edits_applied(), 1);
    assert_eq!(
        fs::read_to_string(&page).unwrap(),
        "<main>\n  <section>\n<p  new-class>\n</main>\n"
    );

    let stale = &summary.results[1];
    assert!(!stale.modified);
    assert_eq!(stale.skipped.len(), 1);
    assert!(matches!(
        stale.skipped[0].reason,
        SkipReason::Rejected(EditError::StaleEditMismatch { .. })
    ));
    assert!(fs::read_to_string(&other).unwrap().contains("other-text"));
}

#[test]
fn test_second_run_is_noop() {
    let dir = TempDir::new().unwrap();
    let file = setup_component(dir.path());
    let problems = write_problems(
        dir.path(),
        r#"[{"resource": "src/App.jsx", "code": "indent", "owner": "eslint",
             "message": "Expected indentation of 4 spaces but found 6.",
             "startLineNumber": 10, "startColumn": 1, "endLineNumber": 10, "endColumn": 7}]"#,
    );
    let options = RunOptions::new(dir.path());

    let first = run(&problems, &options).unwrap();
    assert_eq!(first.files_modified(), 1);
    let patched = fs::read(&file).unwrap();

    let second = run(&problems, &options).unwrap();
    assert_eq!(second.files_modified(), 0);
    assert_eq!(second.edits_applied(), 0);
    assert_eq!(fs::read(&file).unwrap(), patched);
}

#[test]
fn test_crlf_file_keeps_terminators() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("index.js");
    fs::write(&file, "a();\r\n      b();\r\nc();").unwrap();
    let problems = write_problems(
        dir.path(),
        r#"[{"file": "index.js", "kind": "indentation-mismatch",
             "message": "Expected indentation of 2 spaces but found 6.", "line": 2}]"#,
    );

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.edits_applied(), 1);
    assert_eq!(fs::read(&file).unwrap(), b"a();\r\n  b();\r\nc();");
}

#[test]
fn test_malformed_document_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let file = setup_component(dir.path());
    let before = fs::read(&file).unwrap();
    let problems = write_problems(
        dir.path(),
        r#"{"file": "src/App.jsx", "kind": "indentation-mismatch", "line": 10}"#,
    );

    let err = run(&problems, &RunOptions::new(dir.path())).unwrap_err();
    assert!(matches!(
        err,
        RunError::DiagnosticsLoad {
            source: DiagnosticsError::Json(_),
            ..
        }
    ));
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[test]
fn test_unknown_and_unparseable_entries() {
    let dir = TempDir::new().unwrap();
    setup_component(dir.path());
    let problems = write_problems(
        dir.path(),
        r#"[
            {"file": "src/App.jsx", "kind": "trailing-whitespace", "message": "x", "line": 1},
            {"file": "src/App.jsx", "kind": "indentation-mismatch", "message": "Bad indent", "line": 2}
        ]"#,
    );

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.entries_total, 2);
    assert_eq!(summary.entries_ignored, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.warnings[0].index, 1);
    assert_eq!(summary.files_considered(), 0);
}

#[test]
fn test_mistyped_entry_does_not_cost_the_document() {
    let dir = TempDir::new().unwrap();
    let file = setup_component(dir.path());
    let problems = write_problems(
        dir.path(),
        r#"[
            {"resource": "src/App.jsx", "code": "semi", "message": null, "startLineNumber": 3},
            {"resource": "src/App.jsx", "code": "indent", "owner": "eslint",
             "message": "Expected indentation of 4 spaces but found 6.", "startLineNumber": 10}
        ]"#,
    );

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.entries_total, 2);
    assert_eq!(summary.malformed.len(), 1);
    assert_eq!(summary.edits_applied(), 1);

    let after = fs::read_to_string(&file).unwrap();
    assert_eq!(
        after.lines().nth(9),
        Some("    return <Mission id={1} />;")
    );
}

#[test]
fn test_absurd_indentation_is_a_warning() {
    let dir = TempDir::new().unwrap();
    let file = setup_component(dir.path());
    let before = fs::read(&file).unwrap();
    let problems = write_problems(
        dir.path(),
        r#"[{"file": "src/App.jsx", "kind": "indentation-mismatch", "line": 10,
             "message": "Expected indentation of 9000000000000000000 spaces but found 6."}]"#,
    );

    let summary = run(&problems, &RunOptions::new(dir.path())).unwrap();
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.edits_applied(), 0);
    assert_eq!(fs::read(&file).unwrap(), before);
}
