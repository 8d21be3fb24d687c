//! Archive handle and query surface
//!
//! An [`Archive`] ties a built [`Catalog`] to the source its flat store is
//! opened from. The table of contents stream is read once while opening and
//! released before `open` returns; the flat store is opened on demand.
//!
//! Two access patterns are supported:
//!
//! - [`Archive::open_file`] and friends acquire a fresh flat store handle per
//!   view, so views can be used in any order.
//! - [`Archive::session`] opens one handle and lends it to one view at a
//!   time. Each view mutably borrows the session, so two views over the
//!   shared handle cannot be alive together.

use crate::catalog::{ArchiveEntry, Catalog, EntryHandle};
use crate::error::{ArchiveError, Result};
use crate::name::{DEFAULT_CODEPAGE, LegacyCodepage, NameResolver};
use crate::source::{DirectorySource, StreamSource};
use crate::version::FormatVersion;
use crate::view::BoundedView;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings used when opening an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    version: FormatVersion,
    codepage: String,
}

impl OpenOptions {
    /// Options for a table of the given version using the default codepage
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            codepage: DEFAULT_CODEPAGE.to_string(),
        }
    }

    /// Options for a numeric table version
    pub fn for_version_number(version: u32) -> Result<Self> {
        FormatVersion::try_from_u32(version).map(Self::new)
    }

    /// Use a different legacy codepage label for non-ASCII names
    pub fn codepage(mut self, label: impl Into<String>) -> Self {
        self.codepage = label.into();
        self
    }

    /// Table version
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// Legacy codepage label
    pub fn codepage_label(&self) -> &str {
        &self.codepage
    }

    /// Resolve the codepage into a name resolver
    pub fn name_resolver(&self) -> Result<NameResolver> {
        LegacyCodepage::from_label(&self.codepage).map(NameResolver::new)
    }
}

/// Opened archive: immutable catalog plus the flat store source
#[derive(Debug)]
pub struct Archive<S> {
    source: S,
    data_name: String,
    catalog: Catalog,
}

fn open_source<S: StreamSource>(source: &S, name: &str) -> Result<S::Stream> {
    source
        .open_stream(name)
        .map_err(|e| ArchiveError::MissingSource {
            name: name.to_string(),
            source: e,
        })
}

impl<S: StreamSource> Archive<S> {
    /// Open an archive from its table of contents and flat store streams
    ///
    /// The codepage is resolved and both streams are opened before any
    /// record is read. Any structural error aborts the open.
    pub fn open(source: S, headers: &str, data: &str, options: &OpenOptions) -> Result<Self> {
        let resolver = options.name_resolver()?;
        let headers_stream = open_source(&source, headers)?;
        drop(open_source(&source, data)?);

        debug!(
            "Scanning {} as {} with codepage {}",
            headers,
            options.version(),
            resolver.codepage().name()
        );
        let catalog = Catalog::from_table(headers_stream, options.version(), resolver)?;
        info!(
            "Opened archive {} ({} entries, data {})",
            headers,
            catalog.len(),
            data
        );

        Ok(Self {
            source,
            data_name: data.to_string(),
            catalog,
        })
    }

    /// The archive's catalog
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Table version the archive was read with
    pub const fn version(&self) -> FormatVersion {
        self.catalog.version()
    }

    /// All entries in table order
    pub fn entries(&self) -> &[ArchiveEntry] {
        self.catalog.entries()
    }

    /// Look up an entry by exact name
    pub fn entry(&self, name: &str) -> Result<&ArchiveEntry> {
        self.catalog.get(name)
    }

    /// Open a view over `entry` on its own flat store handle
    pub fn open_entry(&self, entry: &ArchiveEntry) -> Result<BoundedView<S::Stream>> {
        let stream = open_source(&self.source, &self.data_name)?;
        debug!(
            "Opening {:?} at {} ({} bytes)",
            entry.name, entry.byte_offset, entry.byte_length
        );
        Ok(BoundedView::for_entry(stream, entry))
    }

    /// Open a view over the entry called `name`
    pub fn open_file(&self, name: &str) -> Result<BoundedView<S::Stream>> {
        let entry = self.catalog.get(name)?;
        self.open_entry(entry)
    }

    /// Open a view over the entry behind `handle`
    pub fn open_handle(&self, handle: EntryHandle) -> Result<BoundedView<S::Stream>> {
        let entry = self.catalog.resolve(handle)?;
        self.open_entry(entry)
    }

    /// Read the entry called `name` into memory
    ///
    /// The buffer is sized from what the flat store can still supply, not
    /// from the stored length alone.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.catalog.get(name)?;
        let mut stream = open_source(&self.source, &self.data_name)?;
        let store_len = stream.seek(SeekFrom::End(0))?;
        let available = store_len
            .saturating_sub(entry.byte_offset)
            .min(u64::from(entry.byte_length));

        let mut data = Vec::with_capacity(usize::try_from(available).unwrap_or(0));
        BoundedView::for_entry(stream, entry).read_to_end(&mut data)?;
        Ok(data)
    }

    /// Open one shared flat store handle for sequential access
    pub fn session(&self) -> Result<SharedSession<'_, S::Stream>> {
        let stream = open_source(&self.source, &self.data_name)?;
        Ok(SharedSession {
            catalog: &self.catalog,
            stream,
        })
    }

    /// Entries whose window runs past the end of the flat store
    pub fn out_of_bounds(&self) -> Result<Vec<&ArchiveEntry>> {
        let mut stream = open_source(&self.source, &self.data_name)?;
        let store_len = stream.seek(SeekFrom::End(0))?;

        Ok(self
            .catalog
            .iter()
            .filter(|entry| entry.end_offset() > store_len)
            .collect())
    }

    /// Close the archive, keeping only its catalog
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }
}

impl Archive<DirectorySource> {
    /// Open an archive whose streams are files below `root`
    pub fn open_dir(
        root: impl Into<PathBuf>,
        headers: &str,
        data: &str,
        options: &OpenOptions,
    ) -> Result<Self> {
        Self::open(DirectorySource::new(root), headers, data, options)
    }
}

/// One flat store handle shared by a sequence of views
///
/// Each view borrows the session mutably, so only one view can use the
/// shared handle at a time. Use independent views from [`Archive::open_file`]
/// when entries must be read concurrently or interleaved.
#[derive(Debug)]
pub struct SharedSession<'a, R> {
    catalog: &'a Catalog,
    stream: R,
}

impl<'a, R: Read + Seek> SharedSession<'a, R> {
    /// Catalog the session reads from
    pub const fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// View over `entry` using the shared handle
    pub fn open(&mut self, entry: &ArchiveEntry) -> BoundedView<&mut R> {
        BoundedView::for_entry(&mut self.stream, entry)
    }

    /// View over the entry called `name` using the shared handle
    pub fn open_name(&mut self, name: &str) -> Result<BoundedView<&mut R>> {
        let catalog = self.catalog;
        let entry = catalog.get(name)?;
        Ok(self.open(entry))
    }

    /// Release the shared handle
    pub fn into_inner(self) -> R {
        self.stream
    }
}
