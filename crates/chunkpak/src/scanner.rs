//! Table of contents scanner
//!
//! Reads fixed-size records front to back and resolves each record's name
//! from the same stream. The table has no record count, so the scan stops
//! on whichever of these comes first:
//!
//! - a clean end of stream
//! - a sentinel record (all stored location fields zero)
//! - a record whose name is empty
//! - a record whose name was already emitted
//!
//! The last case is a packer quirk: the final entry is written twice. The
//! duplicate is dropped and the first occurrence is kept.

use crate::error::{ArchiveError, Result};
use crate::name::NameResolver;
use crate::record::{RawRecord, RecordCodec};
use crate::version::FormatVersion;
use std::collections::HashSet;
use std::io::{Read, Seek};
use tracing::{debug, warn};

/// Why a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Stream ended on a record boundary
    EndOfStream,
    /// Sentinel record reached
    Sentinel,
    /// Record with an empty name reached
    EmptyName,
    /// Record repeating an already emitted name reached and discarded
    DuplicateName,
}

/// A record together with its resolved name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Offset of the record within the table stream
    pub offset: u64,
    /// Decoded record
    pub record: RawRecord,
    /// Resolved file name
    pub name: String,
}

/// Sequential scanner over a table of contents stream
pub struct TocScanner<R> {
    reader: R,
    codec: RecordCodec,
    resolver: NameResolver,
    position: u64,
    seen: HashSet<String>,
    termination: Option<Termination>,
    failed: bool,
}

impl<R: Read + Seek> TocScanner<R> {
    /// Create a scanner starting at the reader's current position
    pub fn new(mut reader: R, version: FormatVersion, resolver: NameResolver) -> Result<Self> {
        let position = reader.stream_position()?;
        Ok(Self {
            reader,
            codec: RecordCodec::new(version),
            resolver,
            position,
            seen: HashSet::new(),
            termination: None,
            failed: false,
        })
    }

    /// Table version being scanned
    pub const fn version(&self) -> FormatVersion {
        self.codec.version()
    }

    /// How the scan ended, once it has
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Scan the next record
    ///
    /// Returns `Ok(None)` once the scan has terminated. Errors are fatal: the
    /// scanner stays terminated and yields nothing further.
    pub fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        if self.termination.is_some() || self.failed {
            return Ok(None);
        }

        let result = self.step();
        self.failed = result.is_err();
        result
    }

    fn step(&mut self) -> Result<Option<ScannedRecord>> {
        let version = self.version();
        let offset = self.position;

        let Some(record) = self.codec.read_record(&mut self.reader, offset)? else {
            return Ok(self.finish(Termination::EndOfStream));
        };
        self.position += version.record_size() as u64;

        if record.is_sentinel(version) {
            debug!("Sentinel record at offset {}", offset);
            return Ok(self.finish(Termination::Sentinel));
        }

        let invalid_offset = || ArchiveError::InvalidNameOffset {
            record_offset: offset,
            name_offset: i64::from(record.file_name_offset),
            position: self.position,
        };
        let name_offset = u64::try_from(record.file_name_offset).map_err(|_| invalid_offset())?;
        if name_offset < self.position {
            return Err(invalid_offset());
        }

        let name = self.resolver.resolve(&mut self.reader, name_offset)?;
        if name.is_empty() {
            debug!("Empty name in record at offset {}", offset);
            return Ok(self.finish(Termination::EmptyName));
        }

        if self.seen.contains(&name) {
            warn!(
                "Discarding trailing duplicate record for {:?} at offset {}",
                name, offset
            );
            return Ok(self.finish(Termination::DuplicateName));
        }

        debug!(
            "Record {:?}: chunk {} length {} at offset {}",
            name, record.chunk_offset, record.byte_length, offset
        );
        self.seen.insert(name.clone());

        Ok(Some(ScannedRecord {
            offset,
            record,
            name,
        }))
    }

    fn finish(&mut self, termination: Termination) -> Option<ScannedRecord> {
        self.termination = Some(termination);
        None
    }
}

impl<R: Read + Seek> Iterator for TocScanner<R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
