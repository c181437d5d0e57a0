use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use diag_patcher::apply::{ApplyResult, SkipReason};
use diag_patcher::config::{load_or_default, Config};
use diag_patcher::diagnostics::DiagnosticKind;
use diag_patcher::{crlf, init_tracing, run, tree, RunOptions, RunSummary, WorkspaceGuard};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "diag-patcher")]
#[command(about = "Apply editor-exported lint diagnostics as verified edits", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./diag-patcher.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix the diagnostics listed in a problems export
    Fix {
        /// Problems export (JSON array); defaults to [fix] default_diagnostics
        problems: Option<PathBuf>,

        /// Only fix diagnostics of this kind (repeatable)
        #[arg(long = "only", value_name = "KIND")]
        only: Vec<DiagnosticKind>,

        /// Resolve relative paths here and refuse files outside it
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Patch files in parallel
        #[arg(short = 'j', long)]
        parallel: bool,
    },

    /// Convert CRLF line endings to LF under a directory
    Crlf {
        /// Directory to scan (defaults to the current directory)
        root: Option<PathBuf>,

        /// Report what would be converted without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Write a text map of the directory structure
    Tree {
        /// Directory to map (defaults to the current directory)
        root: Option<PathBuf>,

        /// Output file (defaults to [tree] output inside ROOT)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the document instead of writing it
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.verbose);

    let cwd = env::current_dir().context("cannot determine the current directory")?;
    let config = load_or_default(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Fix {
            problems,
            only,
            root,
            dry_run,
            diff,
            parallel,
        } => cmd_fix(
            &config,
            &cwd,
            FixArgs {
                problems,
                only,
                root,
                dry_run,
                diff,
                parallel,
            },
        ),

        Commands::Crlf { root, dry_run } => cmd_crlf(&config, root.unwrap_or(cwd), dry_run),

        Commands::Tree {
            root,
            output,
            stdout,
        } => cmd_tree(&config, root.unwrap_or(cwd), output, stdout),
    }
}

struct FixArgs {
    problems: Option<PathBuf>,
    only: Vec<DiagnosticKind>,
    root: Option<PathBuf>,
    dry_run: bool,
    diff: bool,
    parallel: bool,
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => continue,
        };
        print!("{}", sign);
    }
}

fn cmd_fix(config: &Config, cwd: &Path, args: FixArgs) -> Result<()> {
    let problems = args
        .problems
        .unwrap_or_else(|| cwd.join(&config.fix.default_diagnostics));

    let mut options = RunOptions::new(cwd);
    if let Some(root) = &args.root {
        let guard = WorkspaceGuard::new(root, config.fix.forbidden_dirs.iter().cloned())
            .with_context(|| format!("invalid --root {}", root.display()))?;
        options.root = guard.workspace_root().to_path_buf();
        options.guard = Some(guard);
    }
    options.rules = config.rules.clone();
    options.kinds = (!args.only.is_empty()).then_some(args.only);
    options.dry_run = args.dry_run;
    options.capture_preview = args.diff;
    options.parallel = args.parallel;

    println!("Diagnostics: {}", problems.display());
    println!("Root: {}", options.root.display());
    if args.dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    let summary = run(&problems, &options)?;
    report_fix(&summary, args.dry_run, args.diff);
    Ok(())
}

fn report_file(result: &ApplyResult, dry_run: bool, show_diff: bool) {
    let file = result.file.display();

    if let Some(error) = &result.error {
        eprintln!("{} {}: {}", "✗".red(), file, error);
        return;
    }

    if result.modified {
        let verb = if dry_run { "Would patch" } else { "Patched" };
        println!(
            "{} {} {} ({} of {} edits)",
            "✓".green(),
            verb,
            file,
            result.edits_applied,
            result.edits_attempted
        );
    } else {
        println!("{} {}: nothing to change", "⊙".yellow(), file);
    }

    for skipped in &result.skipped {
        match &skipped.reason {
            SkipReason::AlreadyApplied => {
                println!("    {} {}", "⊙".yellow(), skipped.to_string().dimmed())
            }
            SkipReason::Rejected(_) => println!("    {} {}", "⚠".yellow(), skipped),
        }
    }

    if show_diff {
        if let Some(preview) = &result.preview {
            display_diff(&result.file, &preview.before, &preview.after);
        }
    }
}

fn report_fix(summary: &RunSummary, dry_run: bool, show_diff: bool) {
    for malformed in &summary.malformed {
        eprintln!("{} {}", "⚠".yellow(), malformed);
    }
    for warning in &summary.warnings {
        eprintln!("{} {}", "⚠".yellow(), warning);
    }
    for unfixable in &summary.unfixable {
        eprintln!(
            "{} {}:{}: cannot fix: {}",
            "⚠".yellow(),
            unfixable.file_path,
            unfixable.line,
            unfixable.reason
        );
    }

    for result in &summary.results {
        report_file(result, dry_run, show_diff);
    }

    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {} diagnostics read ({} not fixable by this tool, {} malformed)",
        summary.entries_total,
        summary.entries_ignored,
        summary.malformed.len()
    );
    println!(
        "  {} edits applied",
        format!("{}", summary.edits_applied()).green()
    );
    println!(
        "  {} edits skipped",
        format!("{}", summary.edits_skipped()).yellow()
    );
    println!(
        "  {} of {} files modified",
        format!("{}", summary.files_modified()).green(),
        summary.files_considered()
    );
    println!(
        "  {} files failed",
        format!("{}", summary.files_failed()).red()
    );
    if summary.edits_applied() == 0 {
        println!("\n{}", "No fixes applied.".dimmed());
    }
}

fn cmd_crlf(config: &Config, root: PathBuf, dry_run: bool) -> Result<()> {
    if !root.is_dir() {
        anyhow::bail!("root directory not found: {}", root.display());
    }

    println!("Scanning for CRLF line endings in: {}", root.display());
    println!("Skipping directories: {}", config.crlf.skip_dirs.join(", "));
    if dry_run {
        println!("{}", "[DRY RUN - no files will be written]".cyan());
    }
    println!();

    let summary = crlf::convert_tree(&root, &config.crlf, dry_run);
    for path in &summary.converted_paths {
        println!("  Converting: {}", path.display());
    }

    let rule = "=".repeat(60);
    println!("\n{rule}");
    println!("{}", "Conversion Summary".bold());
    println!("{rule}");
    println!(
        "  Files converted:     {}",
        format!("{}", summary.converted).green()
    );
    println!("  Files already LF:    {}", summary.already_lf);
    println!(
        "  Errors:              {}",
        format!("{}", summary.errors).red()
    );
    println!("  Total files scanned: {}", summary.scanned);
    println!("{rule}");

    if summary.converted > 0 {
        println!("\nConverted {} file(s) to LF.", summary.converted);
    } else {
        println!("\nNo conversion needed. All files already use LF.");
    }
    Ok(())
}

fn cmd_tree(config: &Config, root: PathBuf, output: Option<PathBuf>, stdout: bool) -> Result<()> {
    let now = chrono::Local::now();

    if stdout {
        let (document, _) = tree::render_document(&root, &config.tree, &now)?;
        println!("{document}");
        return Ok(());
    }

    let output = output.unwrap_or_else(|| root.join(&config.tree.output));
    println!("Mapping file structure from: {}", root.display());
    let count = tree::write_document(&root, &config.tree, &output, &now)?;

    println!("{} Output saved to: {}", "✓".green(), output.display());
    println!("{} Total lines: {}", "✓".green(), count);
    Ok(())
}
