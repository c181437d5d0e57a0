//! Render a project's directory structure as a text tree.

use crate::apply::atomic_write;
use crate::config::TreeConfig;
use chrono::{DateTime, TimeZone};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

const RULE_WIDTH: usize = 80;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid ignore pattern: {0}")]
    Pattern(#[from] globset::Error),
}

fn ignore_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Directories first, then case-insensitive name.
fn listing_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir.cmp(&a_dir).then_with(|| {
        a.file_name()
            .to_string_lossy()
            .to_lowercase()
            .cmp(&b.file_name().to_string_lossy().to_lowercase())
    })
}

fn render_dir(
    dir: &Path,
    prefix: &str,
    ignore: &GlobSet,
    lines: &mut Vec<String>,
) -> Result<(), TreeError> {
    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by(listing_order)
    {
        match entry {
            Ok(entry) if ignore.is_match(entry.file_name()) => {}
            Ok(entry) => children.push(entry),
            Err(e) if e.io_error().map(io::Error::kind) == Some(io::ErrorKind::PermissionDenied) => {
                lines.push(format!("{prefix}[Permission Denied]"));
                return Ok(());
            }
            Err(e) => {
                return Err(TreeError::Io {
                    path: e.path().unwrap_or(dir).to_path_buf(),
                    source: e.into(),
                })
            }
        }
    }

    let count = children.len();
    for (index, child) in children.into_iter().enumerate() {
        let last = index + 1 == count;
        let (branch, continuation) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };
        let name = child.file_name().to_string_lossy();

        if child.file_type().is_dir() {
            lines.push(format!("{prefix}{branch}{name}/"));
            render_dir(
                child.path(),
                &format!("{prefix}{continuation}"),
                ignore,
                lines,
            )?;
        } else {
            lines.push(format!("{prefix}{branch}{name}"));
        }
    }

    Ok(())
}

fn tree_lines(root: &Path, config: &TreeConfig) -> Result<(PathBuf, Vec<String>), TreeError> {
    let root = root.canonicalize().map_err(|source| TreeError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(TreeError::NotADirectory(root));
    }
    let ignore = ignore_set(&config.ignore)?;

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());
    let mut lines = vec![format!("{name}/")];
    render_dir(&root, "", &ignore, &mut lines)?;
    Ok((root, lines))
}

/// Render the tree under `root`, one entry per line, without a header.
pub fn render_tree(root: &Path, config: &TreeConfig) -> Result<String, TreeError> {
    let (_, lines) = tree_lines(root, config)?;
    Ok(lines.join("\n"))
}

/// Render the full document: header block followed by the tree.
///
/// Returns the document and the number of tree lines.
pub fn render_document<Tz>(
    root: &Path,
    config: &TreeConfig,
    now: &DateTime<Tz>,
) -> Result<(String, usize), TreeError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (root, lines) = tree_lines(root, config)?;
    let rule = "=".repeat(RULE_WIDTH);

    let mut document = vec![
        rule.clone(),
        config.title.clone(),
        rule.clone(),
        format!("Generated: {}", now.format("%Y-%m-%d %H:%M:%S")),
        format!("Root Directory: {}", root.display()),
        rule,
        String::new(),
    ];
    let count = lines.len();
    document.extend(lines);
    Ok((document.join("\n"), count))
}

/// Write the document to `output`, returning the number of tree lines.
pub fn write_document<Tz>(
    root: &Path,
    config: &TreeConfig,
    output: &Path,
    now: &DateTime<Tz>,
) -> Result<usize, TreeError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let (document, count) = render_document(root, config, now)?;
    atomic_write(output, document.as_bytes()).map_err(|source| TreeError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::info!(output = %output.display(), lines = count, "wrote file structure");
    Ok(count)
}
