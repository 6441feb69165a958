//! Main entry point for the zipstream CLI application.
//!
//! Walks the given paths and streams them into a ZIP archive written to a
//! file or to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use walkdir::WalkDir;

use zipstream::zip::CentralDirectoryHeader;
use zipstream::{Cli, ZipOptions, ZipWriter};

/// Application entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let mut own_output = None;
    let output: Box<dyn Write> = if cli.writes_to_stdout() {
        Box::new(BufWriter::new(io::stdout().lock()))
    } else {
        let path = cli.output.as_deref().unwrap_or("-");
        let file = File::create(path).with_context(|| format!("cannot create {path}"))?;
        own_output = Some(
            Path::new(path)
                .canonicalize()
                .with_context(|| format!("cannot resolve {path}"))?,
        );
        Box::new(BufWriter::new(file))
    };

    let mut writer = ZipWriter::new(ZipOptions::default().level(cli.level));
    writer.pipe_to(output);

    for root in &cli.paths {
        add_tree(&mut writer, Path::new(root), own_output.as_deref(), &cli)?;
    }

    let summary = writer.finish().context("failed to finish archive")?;

    if cli.verbose > 0 && !cli.quiet {
        for line in listing(writer.central_directory()) {
            eprintln!("{line}");
        }
    }

    if !cli.quiet {
        eprintln!(
            "{} entries, {} total",
            summary.entries,
            format_size(summary.total_size)
        );
    }

    Ok(())
}

/// Add `root` and everything below it.
///
/// Entry names are relative to the parent of `root`, so `zipstream a/b`
/// stores `b/...`. Symlinks are skipped, and so is `own_output`, the archive
/// being written.
fn add_tree(
    writer: &mut ZipWriter<'_>,
    root: &Path,
    own_output: Option<&Path>,
    cli: &Cli,
) -> Result<()> {
    // "." and ".." have no file name; store their contents without a prefix
    let base = match root.file_name() {
        Some(_) => root.parent().unwrap_or(Path::new("")),
        None => root,
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot read {}", root.display()))?;
        let relative = entry.path().strip_prefix(base)?;
        let name = archive_name(relative);
        if name.is_empty() {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            writer
                .write_directory(&name)
                .with_context(|| format!("cannot add {name}"))?;
        } else if file_type.is_file() {
            if is_same_file(entry.path(), own_output) {
                warn!("skipping {}: it is the output archive", entry.path().display());
                continue;
            }
            let data = std::fs::read(entry.path())
                .with_context(|| format!("cannot read {}", entry.path().display()))?;
            writer
                .write_path(&name, &data, Some(cli.level))
                .with_context(|| format!("cannot add {name}"))?;
        } else {
            warn!("skipping {}: not a regular file", entry.path().display());
            continue;
        }

        if !cli.quiet {
            eprintln!("  adding: {name}");
        }
    }

    Ok(())
}

/// Whether `path` resolves to `target`.
fn is_same_file(path: &Path, target: Option<&Path>) -> bool {
    match target {
        Some(target) => path
            .canonicalize()
            .map(|p| p == target)
            .unwrap_or(false),
        None => false,
    }
}

/// One line per central directory entry: sizes, method and name.
fn listing(headers: &[CentralDirectoryHeader]) -> Vec<String> {
    headers
        .iter()
        .map(|h| {
            let name = String::from_utf8_lossy(&h.file_name);
            if h.is_directory() {
                format!("{:>10} {:>10}  {:<8} {name}", "-", "-", "dir")
            } else {
                format!(
                    "{:>10} {:>10}  {:<8} {name}",
                    h.uncompressed_size,
                    h.compressed_size,
                    format!("{:?}", h.compression_method).to_lowercase()
                )
            }
        })
        .collect()
}

/// Join path components with `/` regardless of platform.
fn archive_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
