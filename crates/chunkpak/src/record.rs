//! Fixed-size table of contents records
//!
//! Each table version stores one record per logical file. The codec decodes
//! whichever layout is active into a version-neutral [`RawRecord`] and can
//! encode it back. Fields a version does not store are left as zero and are
//! derived later by the catalog builder.

use crate::error::{ArchiveError, Result};
use crate::version::FormatVersion;
use binrw::{BinRead, BinWrite};
use std::io::{Cursor, ErrorKind, Read, Write};

/// Version-neutral table of contents record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// Offset of the null-terminated name within the table stream
    ///
    /// Signed as stored. Sentinels may carry any value, so the scanner only
    /// validates it on records that name a file.
    pub file_name_offset: i32,
    /// Byte offset of the file in the flat store (V2 only)
    pub byte_offset: u32,
    /// Length of the file in bytes
    pub byte_length: u32,
    /// First chunk of the file in the flat store
    pub chunk_offset: u32,
    /// Number of chunks occupied (V2 and V3 only)
    pub chunk_count: u32,
}

impl RawRecord {
    /// Check whether this record marks the end of the table
    ///
    /// The sentinel has every location field the version stores set to zero.
    /// The name offset is not part of the pattern.
    pub fn is_sentinel(&self, version: FormatVersion) -> bool {
        let common = self.byte_length == 0 && self.chunk_offset == 0;
        match version {
            FormatVersion::V2 => common && self.byte_offset == 0 && self.chunk_count == 0,
            FormatVersion::V3 => common && self.chunk_count == 0,
            FormatVersion::V4 => common,
        }
    }

    /// Copy of this record with the fields `version` does not store cleared
    pub fn stored_fields(&self, version: FormatVersion) -> Self {
        Self {
            byte_offset: if version.stores_byte_offset() {
                self.byte_offset
            } else {
                0
            },
            chunk_count: if version.stores_chunk_count() {
                self.chunk_count
            } else {
                0
            },
            ..*self
        }
    }
}

/// V2 layout: 32 bytes with explicit byte offset and chunk count
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
struct RecordV2 {
    name_offset: i32,
    reserved: [i32; 3],
    byte_offset: i32,
    byte_length: i32,
    chunk_offset: i32,
    chunk_count: i32,
}

/// V3 layout: 16 bytes, byte offset derived from the chunk offset
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
struct RecordV3 {
    name_offset: i32,
    byte_length: i32,
    chunk_offset: i32,
    chunk_count: i32,
}

/// V4 layout: 12 bytes, byte offset and chunk count derived
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
struct RecordV4 {
    name_offset: i32,
    byte_length: i32,
    chunk_offset: i32,
}

/// Decoder and encoder for one table version
///
/// Owns a single record buffer that is reused for every call, so reading a
/// table does not allocate per record. Not meant to be shared between a
/// reader and a writer at the same time.
#[derive(Debug, Clone)]
pub struct RecordCodec {
    version: FormatVersion,
    buffer: [u8; FormatVersion::MAX_RECORD_SIZE],
}

impl RecordCodec {
    /// Create a codec for `version`
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            buffer: [0u8; FormatVersion::MAX_RECORD_SIZE],
        }
    }

    /// Active table version
    pub const fn version(&self) -> FormatVersion {
        self.version
    }

    /// Record size of the active version
    pub const fn record_size(&self) -> usize {
        self.version.record_size()
    }

    /// Read and decode the next record from `reader`
    ///
    /// Returns `Ok(None)` on a clean end of stream (zero bytes available).
    /// A partial record is reported as [`ArchiveError::TruncatedTable`].
    /// `offset` is the stream position of the record and is only used for
    /// error reporting.
    pub fn read_record<R: Read>(&mut self, reader: &mut R, offset: u64) -> Result<Option<RawRecord>> {
        let size = self.record_size();
        let mut filled = 0;

        while filled < size {
            match reader.read(&mut self.buffer[filled..size]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < size {
            return Err(ArchiveError::TruncatedTable {
                offset,
                read: filled,
                expected: size,
            });
        }

        decode_with(self.version, &self.buffer[..size], offset).map(Some)
    }

    /// Decode one record from a buffer of exactly the record size
    pub fn decode(&self, bytes: &[u8], offset: u64) -> Result<RawRecord> {
        decode_with(self.version, bytes, offset)
    }

    /// Encode a record into the codec's buffer and return the encoded bytes
    ///
    /// Fields the active version does not store are ignored.
    pub fn encode(&mut self, record: &RawRecord) -> Result<&[u8]> {
        let size = self.record_size();
        let name_offset = record.file_name_offset;
        let byte_length = signed(record.byte_length, "byte_length")?;
        let chunk_offset = signed(record.chunk_offset, "chunk_offset")?;

        let mut cursor = Cursor::new(&mut self.buffer[..size]);
        match self.version {
            FormatVersion::V2 => RecordV2 {
                name_offset,
                reserved: [0; 3],
                byte_offset: signed(record.byte_offset, "byte_offset")?,
                byte_length,
                chunk_offset,
                chunk_count: signed(record.chunk_count, "chunk_count")?,
            }
            .write(&mut cursor)?,
            FormatVersion::V3 => RecordV3 {
                name_offset,
                byte_length,
                chunk_offset,
                chunk_count: signed(record.chunk_count, "chunk_count")?,
            }
            .write(&mut cursor)?,
            FormatVersion::V4 => RecordV4 {
                name_offset,
                byte_length,
                chunk_offset,
            }
            .write(&mut cursor)?,
        }

        Ok(&self.buffer[..size])
    }

    /// Encode a record and write it to `writer`
    pub fn write_record<W: Write>(&mut self, record: &RawRecord, writer: &mut W) -> Result<()> {
        let bytes = self.encode(record)?;
        writer.write_all(bytes)?;
        Ok(())
    }
}

fn decode_with(version: FormatVersion, bytes: &[u8], offset: u64) -> Result<RawRecord> {
    if bytes.len() != version.record_size() {
        return Err(ArchiveError::RecordSize {
            expected: version.record_size(),
            actual: bytes.len(),
        });
    }

    let field = |value: i32, name: &str| -> Result<u32> {
        u32::try_from(value).map_err(|_| ArchiveError::InvalidRecord {
            offset,
            reason: format!("{name} is negative ({value})"),
        })
    };

    let mut cursor = Cursor::new(bytes);
    let record = match version {
        FormatVersion::V2 => {
            let raw = RecordV2::read(&mut cursor)?;
            RawRecord {
                file_name_offset: raw.name_offset,
                byte_offset: field(raw.byte_offset, "byte offset")?,
                byte_length: field(raw.byte_length, "byte length")?,
                chunk_offset: field(raw.chunk_offset, "chunk offset")?,
                chunk_count: field(raw.chunk_count, "chunk count")?,
            }
        }
        FormatVersion::V3 => {
            let raw = RecordV3::read(&mut cursor)?;
            RawRecord {
                file_name_offset: raw.name_offset,
                byte_offset: 0,
                byte_length: field(raw.byte_length, "byte length")?,
                chunk_offset: field(raw.chunk_offset, "chunk offset")?,
                chunk_count: field(raw.chunk_count, "chunk count")?,
            }
        }
        FormatVersion::V4 => {
            let raw = RecordV4::read(&mut cursor)?;
            RawRecord {
                file_name_offset: raw.name_offset,
                byte_offset: 0,
                byte_length: field(raw.byte_length, "byte length")?,
                chunk_offset: field(raw.chunk_offset, "chunk offset")?,
                chunk_count: 0,
            }
        }
    };

    Ok(record)
}

fn signed(value: u32, field: &'static str) -> Result<i32> {
    i32::try_from(value).map_err(|_| ArchiveError::FieldOverflow { field, value })
}
