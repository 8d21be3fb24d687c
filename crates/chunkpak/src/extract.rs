//! Bulk extraction into a directory tree

use crate::archive::Archive;
use crate::error::{ArchiveError, Result};
use crate::source::StreamSource;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Totals reported by [`Archive::extract_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Files written
    pub files: usize,
    /// Bytes written across all files
    pub bytes: u64,
    /// Files that came out shorter than their catalog length
    pub short_files: usize,
}

/// Map an entry name to a relative path
///
/// Both `/` and `\` separate components. Names that are empty or contain
/// `.`, `..` or drive prefixes are rejected so nothing lands outside the
/// target directory.
pub fn entry_path(name: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();

    for component in name.split(['/', '\\']) {
        if component.is_empty() || component == "." || component == ".." || component.contains(':')
        {
            return Err(ArchiveError::InvalidEntryName(name.to_string()));
        }
        path.push(component);
    }

    Ok(path)
}

impl<S: StreamSource> Archive<S> {
    /// Extract every entry below `dir`, mirroring entry names as paths
    ///
    /// Entries are read one after another through a single shared flat
    /// store handle. Intermediate directories are created as needed.
    pub fn extract_all(&self, dir: impl AsRef<Path>) -> Result<ExtractSummary> {
        let dir = dir.as_ref();
        let mut session = self.session()?;
        let mut summary = ExtractSummary::default();

        for entry in self.catalog() {
            let target = dir.join(entry_path(&entry.name)?);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut out = BufWriter::new(File::create(&target)?);
            let copied = io::copy(&mut session.open(entry), &mut out)?;
            out.flush()?;

            if copied < u64::from(entry.byte_length) {
                warn!(
                    "{} is short: wrote {} of {} bytes",
                    entry.name, copied, entry.byte_length
                );
                summary.short_files += 1;
            }
            debug!("Extracted {} ({} bytes)", target.display(), copied);

            summary.files += 1;
            summary.bytes += copied;
        }

        info!(
            "Extracted {} files ({} bytes) to {}",
            summary.files,
            summary.bytes,
            dir.display()
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_path_splits_separators() {
        let path = entry_path("sound/bgm\\title.adx").unwrap();
        assert_eq!(path, Path::new("sound").join("bgm").join("title.adx"));
    }

    #[test]
    fn test_entry_path_keeps_codepage_names() {
        let path = entry_path("\u{30C6}\u{30B9}\u{30C8}/a.bin").unwrap();
        assert_eq!(path, Path::new("\u{30C6}\u{30B9}\u{30C8}").join("a.bin"));
    }

    #[test]
    fn test_entry_path_rejects_escapes() {
        for name in ["../evil", "a/../../b", "/abs", "c:/win", "a//b", "./x", "dir/"] {
            assert!(
                matches!(entry_path(name), Err(ArchiveError::InvalidEntryName(_))),
                "{name} should be rejected"
            );
        }
    }
}
