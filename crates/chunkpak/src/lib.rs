//! Reader for chunk-addressed game asset containers
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Format-specific terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! Assets are packed into one flat data store addressed in 2048-byte chunks,
//! next to a small table of contents made of fixed-size records. This crate
//! scans the table into an immutable, name-indexed [`Catalog`] and hands out
//! [`BoundedView`]s that expose exactly one entry's bytes of the data store.
//!
//! # Table layouts
//!
//! Three record layouts exist, see [`FormatVersion`]:
//!
//! - **V2**: 32-byte records storing byte offset and chunk count
//! - **V3**: 16-byte records, byte offset derived from the chunk offset
//! - **V4**: 12-byte records, byte offset and chunk count derived
//!
//! Names are null-terminated strings elsewhere in the table stream, either
//! 7-bit ASCII or Shift-JIS. The table has no record count; the scan ends on
//! end of stream, a sentinel record, an empty name, or a repeated name.
//!
//! # Usage
//!
//! ```rust,no_run
//! use chunkpak::{Archive, FormatVersion, OpenOptions};
//! use std::io::Read;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = OpenOptions::new(FormatVersion::V3);
//! let archive = Archive::open_dir("disc", "ASSETS.HED", "ASSETS.DAT", &options)?;
//!
//! for entry in archive.entries() {
//!     println!("{} ({} bytes)", entry.name, entry.byte_length);
//! }
//!
//! let mut view = archive.open_file("system/font.bin")?;
//! let mut data = Vec::new();
//! view.read_to_end(&mut data)?;
//!
//! archive.extract_all("out")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod archive;
pub mod catalog;
pub mod chunk;
pub mod config;
pub mod error;
pub mod extract;
pub mod name;
pub mod record;
pub mod scanner;
pub mod source;
pub mod version;
pub mod view;

pub use archive::{Archive, OpenOptions, SharedSession};
pub use catalog::{ArchiveEntry, Catalog, CatalogBuilder, EntryHandle};
pub use chunk::{CHUNK_SIZE, chunk_count_of, offset_of};
pub use error::{ArchiveError, Result};
pub use extract::{ExtractSummary, entry_path};
pub use name::{DEFAULT_CODEPAGE, LegacyCodepage, NameResolver};
pub use record::{RawRecord, RecordCodec};
pub use scanner::{ScannedRecord, Termination, TocScanner};
pub use source::{DirectorySource, MemorySource, StreamSource};
pub use version::FormatVersion;
pub use view::BoundedView;
