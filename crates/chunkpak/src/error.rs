//! Error types for archive operations

use thiserror::Error;

/// Archive operation result type
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors raised while opening, scanning or reading an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// A required input stream could not be opened
    #[error("Missing source {name}: {source}")]
    MissingSource {
        /// Name of the stream that was requested
        name: String,
        /// Underlying open failure
        source: std::io::Error,
    },

    /// Format version is not one of the known table layouts
    #[error("Unsupported table version: {0}")]
    UnsupportedVersion(u32),

    /// The table of contents ended in the middle of a record
    #[error("Truncated table at offset {offset}: read {read} of {expected} bytes")]
    TruncatedTable {
        /// Offset of the partial record
        offset: u64,
        /// Bytes actually available
        read: usize,
        /// Fixed record size for the active version
        expected: usize,
    },

    /// A name offset is negative or points back into already scanned bytes
    #[error(
        "Invalid name offset {name_offset} in record at {record_offset} (scan position {position})"
    )]
    InvalidNameOffset {
        /// Offset of the record holding the reference
        record_offset: u64,
        /// Offset the record points at, as stored
        name_offset: i64,
        /// Scanner position after the record was read
        position: u64,
    },

    /// A stored field carries a value the format cannot represent
    #[error("Invalid record at offset {offset}: {reason}")]
    InvalidRecord {
        /// Offset of the record in the table
        offset: u64,
        /// Description of the offending field
        reason: String,
    },

    /// A value does not fit the signed 32-bit on-disk field
    #[error("Value {value} does not fit field {field}")]
    FieldOverflow {
        /// Name of the field being encoded
        field: &'static str,
        /// Value that was supplied
        value: u32,
    },

    /// Record buffer length does not match the version's record size
    #[error("Record size mismatch: expected {expected} bytes, got {actual}")]
    RecordSize {
        /// Record size of the active version
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },

    /// Two catalog entries share a name
    #[error("Duplicate entry name: {0}")]
    DuplicateName(String),

    /// The configured legacy codepage is not known to the decoder
    #[error("Text encoding unavailable: {0}")]
    EncodingUnavailable(String),

    /// A name could not be decoded with the legacy codepage
    #[error("Name at offset {offset} is not valid {codepage}")]
    NameDecode {
        /// Offset of the name string
        offset: u64,
        /// Codepage used for decoding
        codepage: &'static str,
    },

    /// No entry with the requested name
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// Entry handle belongs to a different catalog
    #[error("Entry handle does not belong to this catalog")]
    ForeignEntry,

    /// Seek target lies outside the view's window
    #[error("Position {requested} is outside window of {length} bytes")]
    WindowOutOfRange {
        /// Requested position relative to the window start
        requested: i64,
        /// Window length
        length: u64,
    },

    /// The operation is not supported by a fixed window
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Entry name cannot be mapped to a path under the output directory
    #[error("Invalid entry name for extraction: {0}")]
    InvalidEntryName(String),

    /// A stream path cannot be passed to a source as text
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Check if this error aborts catalog construction
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MissingSource { .. }
                | Self::UnsupportedVersion(_)
                | Self::TruncatedTable { .. }
                | Self::InvalidNameOffset { .. }
                | Self::InvalidRecord { .. }
                | Self::DuplicateName(_)
                | Self::EncodingUnavailable(_)
                | Self::NameDecode { .. }
        )
    }

    /// Check if this error only affects the calling operation
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound(_)
                | Self::ForeignEntry
                | Self::WindowOutOfRange { .. }
                | Self::UnsupportedOperation(_)
                | Self::InvalidEntryName(_)
        )
    }
}

impl From<ArchiveError> for std::io::Error {
    fn from(err: ArchiveError) -> Self {
        match err {
            ArchiveError::Io(inner) => inner,
            ArchiveError::WindowOutOfRange { .. } => {
                Self::new(std::io::ErrorKind::InvalidInput, err)
            }
            ArchiveError::UnsupportedOperation(_) => {
                Self::new(std::io::ErrorKind::Unsupported, err)
            }
            other => Self::other(other),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ArchiveError::UnsupportedVersion(7).is_structural());
        assert!(
            ArchiveError::TruncatedTable {
                offset: 32,
                read: 10,
                expected: 16
            }
            .is_structural()
        );
        assert!(!ArchiveError::EntryNotFound("a".into()).is_structural());
        assert!(ArchiveError::EntryNotFound("a".into()).is_local());
        assert!(ArchiveError::UnsupportedOperation("set_len").is_local());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let err: std::io::Error = ArchiveError::WindowOutOfRange {
            requested: -1,
            length: 10,
        }
        .into();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        let err: std::io::Error = ArchiveError::UnsupportedOperation("set_len").into();
        assert_eq!(err.kind(), std::io::ErrorKind::Unsupported);
    }
}
