//! Name-indexed catalog of logical files
//!
//! The catalog is built once from a table of contents scan and is immutable
//! afterwards. Entries live in a flat vector in table order; lookups go
//! through a name index. Callers that need to keep a reference to an entry
//! without borrowing the catalog hold an [`EntryHandle`], which is checked
//! against the catalog it came from on every access.

use crate::chunk;
use crate::error::{ArchiveError, Result};
use crate::name::NameResolver;
use crate::record::RawRecord;
use crate::scanner::{Termination, TocScanner};
use crate::version::FormatVersion;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(1);

/// One logical file in the flat store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// File name as stored in the table
    pub name: String,
    /// Absolute byte offset in the flat store
    pub byte_offset: u64,
    /// Length in bytes (zero for placeholder assets)
    pub byte_length: u32,
    /// First chunk in the flat store
    pub chunk_offset: u32,
    /// Number of chunks occupied
    pub chunk_count: u32,
}

impl ArchiveEntry {
    /// Build an entry from a raw record, deriving the fields `version` does not store
    pub fn from_record(version: FormatVersion, record: &RawRecord, name: String) -> Self {
        let byte_offset = if version.stores_byte_offset() {
            u64::from(record.byte_offset)
        } else {
            chunk::offset_of(record.chunk_offset)
        };
        let chunk_count = if version.stores_chunk_count() {
            record.chunk_count
        } else {
            chunk::chunk_count_of(record.byte_length)
        };

        Self {
            name,
            byte_offset,
            byte_length: record.byte_length,
            chunk_offset: record.chunk_offset,
            chunk_count,
        }
    }

    /// Offset one past the last byte of the entry
    pub fn end_offset(&self) -> u64 {
        self.byte_offset + u64::from(self.byte_length)
    }

    /// Check if the entry holds no data
    pub fn is_empty(&self) -> bool {
        self.byte_length == 0
    }
}

/// Reference to an entry that is validated against its owning catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    catalog: u64,
    index: usize,
}

impl EntryHandle {
    /// Position of the entry in table order
    pub const fn index(&self) -> usize {
        self.index
    }
}

/// Immutable catalog of archive entries
#[derive(Debug, Clone)]
pub struct Catalog {
    id: u64,
    version: FormatVersion,
    entries: Vec<ArchiveEntry>,
    by_name: HashMap<String, usize>,
    termination: Option<Termination>,
}

impl Catalog {
    /// Scan a table of contents stream and build its catalog
    ///
    /// Construction is all or nothing: any structural error discards the
    /// entries collected so far.
    pub fn from_table<R: Read + Seek>(
        reader: R,
        version: FormatVersion,
        resolver: NameResolver,
    ) -> Result<Self> {
        let mut scanner = TocScanner::new(reader, version, resolver)?;
        let mut builder = CatalogBuilder::new(version);

        while let Some(scanned) = scanner.next_record()? {
            builder.push(&scanned.record, scanned.name)?;
        }

        builder.termination = scanner.termination();
        Ok(builder.build())
    }

    /// Table version the catalog was read from
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// How the table scan ended
    pub const fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in table order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Iterate entries in table order
    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }

    /// Look up an entry by exact name
    pub fn find(&self, name: &str) -> Option<&ArchiveEntry> {
        self.by_name.get(name).map(|&index| &self.entries[index])
    }

    /// Look up an entry by exact name, failing if it is absent
    pub fn get(&self, name: &str) -> Result<&ArchiveEntry> {
        self.find(name)
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))
    }

    /// Check if an entry with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Handle for the entry with this name
    pub fn handle(&self, name: &str) -> Result<EntryHandle> {
        self.by_name
            .get(name)
            .map(|&index| EntryHandle {
                catalog: self.id,
                index,
            })
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))
    }

    /// Handles for all entries in table order
    pub fn handles(&self) -> impl Iterator<Item = EntryHandle> + '_ {
        (0..self.entries.len()).map(|index| EntryHandle {
            catalog: self.id,
            index,
        })
    }

    /// Resolve a handle issued by this catalog
    pub fn resolve(&self, handle: EntryHandle) -> Result<&ArchiveEntry> {
        if handle.catalog != self.id {
            return Err(ArchiveError::ForeignEntry);
        }
        self.entries.get(handle.index).ok_or(ArchiveError::ForeignEntry)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ArchiveEntry;
    type IntoIter = std::slice::Iter<'a, ArchiveEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Accumulates scanned records into a [`Catalog`]
#[derive(Debug)]
pub struct CatalogBuilder {
    version: FormatVersion,
    entries: Vec<ArchiveEntry>,
    by_name: HashMap<String, usize>,
    termination: Option<Termination>,
}

impl CatalogBuilder {
    /// Create an empty builder for `version`
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            entries: Vec::new(),
            by_name: HashMap::new(),
            termination: None,
        }
    }

    /// Add a record under `name`
    ///
    /// Zero-length records are kept. A name that is already present is a
    /// structural error.
    pub fn push(&mut self, record: &RawRecord, name: String) -> Result<()> {
        if self.by_name.contains_key(&name) {
            return Err(ArchiveError::DuplicateName(name));
        }

        let entry = ArchiveEntry::from_record(self.version, record, name);
        self.by_name.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Number of entries added so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries were added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish the catalog
    pub fn build(self) -> Catalog {
        let empty = self.entries.iter().filter(|e| e.is_empty()).count();
        info!(
            "Built {} catalog with {} entries ({} empty)",
            self.version,
            self.entries.len(),
            empty
        );

        Catalog {
            id: NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed),
            version: self.version,
            entries: self.entries,
            by_name: self.by_name,
            termination: self.termination,
        }
    }
}
