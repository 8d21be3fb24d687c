//! Command-line configuration.
//!
//! Every archive option can be given as a CLI argument or through an
//! environment variable:
//!
//! - `--headers` / `CHUNKPAK_HEADERS`: table of contents file
//! - `--data` / `CHUNKPAK_DATA`: flat data store file
//! - `--format-version` / `CHUNKPAK_FORMAT_VERSION`: table layout (2, 3 or 4)
//! - `--codepage` / `CHUNKPAK_CODEPAGE`: legacy codepage for non-ASCII names
//!
//! # Example
//!
//! ```no_run
//! use chunkpak::config::Cli;
//!
//! let cli = Cli::from_args();
//! let options = cli.archive.validate().expect("Invalid configuration");
//! println!("Reading {} as {}", cli.archive.headers.display(), options.version());
//! ```

use crate::archive::OpenOptions;
use crate::error::{ArchiveError, Result};
use crate::name::DEFAULT_CODEPAGE;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Reader for chunk-addressed asset containers
#[derive(Debug, Clone, Parser)]
#[command(
    name = "chunkpak",
    about = "Inspect and extract chunk-addressed game asset containers",
    version
)]
pub struct Cli {
    /// Archive location and format
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}

/// Archive inputs shared by all subcommands
#[derive(Debug, Clone, Args)]
pub struct ArchiveArgs {
    /// Table of contents (headers) file
    #[arg(long, env = "CHUNKPAK_HEADERS")]
    pub headers: PathBuf,

    /// Flat data store file
    #[arg(long, env = "CHUNKPAK_DATA")]
    pub data: PathBuf,

    /// Table layout version (2, 3 or 4)
    #[arg(long, env = "CHUNKPAK_FORMAT_VERSION", default_value_t = 4)]
    pub format_version: u32,

    /// Legacy codepage label used for non-ASCII names
    #[arg(long, env = "CHUNKPAK_CODEPAGE", default_value = DEFAULT_CODEPAGE)]
    pub codepage: String,
}

impl ArchiveArgs {
    /// Validate the arguments and turn them into open options.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedVersion` for an unknown table layout and
    /// `EncodingUnavailable` for an unknown codepage label.
    pub fn validate(&self) -> Result<OpenOptions> {
        let options =
            OpenOptions::for_version_number(self.format_version)?.codepage(self.codepage.clone());
        options.name_resolver()?;
        Ok(options)
    }

    /// Headers and data paths as stream names
    ///
    /// # Errors
    ///
    /// Returns `NonUtf8Path` when either path is not valid UTF-8.
    pub fn stream_names(&self) -> Result<(&str, &str)> {
        Ok((utf8_path(&self.headers)?, utf8_path(&self.data)?))
    }
}

fn utf8_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| ArchiveError::NonUtf8Path(path.to_path_buf()))
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all entries in table order
    List,
    /// Show one entry's location
    Info {
        /// Entry name
        name: String,
    },
    /// Write one entry's bytes to stdout
    Cat {
        /// Entry name
        name: String,
    },
    /// Extract every entry into a directory
    Extract {
        /// Output directory
        dir: PathBuf,
    },
    /// Report entries that run past the end of the data store
    Check,
}
