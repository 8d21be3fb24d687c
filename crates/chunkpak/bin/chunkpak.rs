//! chunkpak binary entry point.
//!
//! Thin wrapper around the chunkpak library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Opens the archive
//! 4. Runs the requested subcommand

use anyhow::{Context, Result};
use chunkpak::config::{Cli, Command};
use chunkpak::{Archive, DirectorySource};
use std::io::{self, Write};

fn main() -> Result<()> {
    // Logs go to stderr so `cat` output stays clean
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::from_args();
    let options = cli.archive.validate()?;

    tracing::debug!(
        "Configuration loaded: headers={:?}, data={:?}, version={}, codepage={}",
        cli.archive.headers,
        cli.archive.data,
        options.version(),
        options.codepage_label()
    );

    let (headers, data) = cli.archive.stream_names()?;
    let archive = Archive::open(DirectorySource::new("."), headers, data, &options)
        .with_context(|| format!("failed to open archive {headers}"))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List => {
            for entry in archive.entries() {
                writeln!(
                    out,
                    "{:>8} {:>6} {:>10}  {}",
                    entry.chunk_offset, entry.chunk_count, entry.byte_length, entry.name
                )?;
            }
        }
        Command::Info { name } => {
            let entry = archive.entry(&name)?;
            writeln!(out, "name:         {}", entry.name)?;
            writeln!(out, "byte offset:  {}", entry.byte_offset)?;
            writeln!(out, "byte length:  {}", entry.byte_length)?;
            writeln!(out, "chunk offset: {}", entry.chunk_offset)?;
            writeln!(out, "chunk count:  {}", entry.chunk_count)?;
        }
        Command::Cat { name } => {
            let mut view = archive.open_file(&name)?;
            io::copy(&mut view, &mut out)?;
        }
        Command::Extract { dir } => {
            let summary = archive
                .extract_all(&dir)
                .with_context(|| format!("failed to extract into {}", dir.display()))?;
            writeln!(
                out,
                "extracted {} files ({} bytes, {} short)",
                summary.files, summary.bytes, summary.short_files
            )?;
        }
        Command::Check => {
            let bad = archive.out_of_bounds()?;
            for entry in &bad {
                writeln!(
                    out,
                    "{} ends at {} past the data store",
                    entry.name,
                    entry.end_offset()
                )?;
            }
            writeln!(out, "{} of {} entries out of bounds", bad.len(), archive.entries().len())?;
        }
    }

    out.flush()?;
    Ok(())
}
