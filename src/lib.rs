//! Diag Patcher: apply editor-exported lint diagnostics as verified edits
//!
//! Reads a problems export (a JSON array of diagnostics from the editor),
//! recognizes the kinds it knows how to fix, and rewrites the affected files
//! in place. Two kinds are supported:
//!
//! - indentation mismatches ("Expected indentation of N spaces but found M.")
//! - canonical class rewrites ("`old` can be written as `new`")
//!
//! # Architecture
//!
//! Every diagnostic compiles down to a single primitive: [`Edit`], a verified
//! replacement of a column span on one line. Edits are grouped per file and
//! applied bottom-to-top, right-to-left, so earlier edits never shift the
//! coordinates of later ones.
//!
//! # Safety
//!
//! - Every edit checks the text it expects before replacing it
//! - Stale edits are skipped, never forced
//! - Atomic file writes (tempfile + fsync + rename), only for modified files
//! - Line terminators are preserved byte for byte
//! - Optional workspace boundary enforcement
//!
//! # Example
//!
//! ```no_run
//! use diag_patcher::{run, RunOptions};
//! use std::path::Path;
//!
//! let summary = run(Path::new("problems.json"), &RunOptions::new(".")).unwrap();
//! println!(
//!     "{} edits applied to {} files",
//!     summary.edits_applied(),
//!     summary.files_modified()
//! );
//! ```

pub mod apply;
pub mod buffer;
pub mod config;
pub mod crlf;
pub mod diagnostics;
pub mod edit;
pub mod group;
pub mod path;
pub mod run;
pub mod safety;
pub mod tree;

// Re-exports
pub use apply::{apply_file, apply_to_buffer, ApplyError, ApplyOptions, ApplyResult, SkipReason};
pub use buffer::{LineBuffer, LineEnding};
pub use config::{load_from_path, load_from_str, load_or_default, Config, ConfigError};
pub use diagnostics::{DiagnosticKind, DiagnosticRecord, RawDiagnostic};
pub use edit::{Edit, EditError, EditVerification};
pub use group::{group_edits, FileEditGroup};
pub use run::{run, run_entries, RunError, RunOptions, RunSummary};
pub use safety::{SafetyError, WorkspaceGuard};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2 = debug, 3+ = trace).
pub fn init_tracing(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbosity {
        0 => "diag_patcher=warn",
        1 => "diag_patcher=info",
        2 => "diag_patcher=debug",
        _ => "diag_patcher=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
