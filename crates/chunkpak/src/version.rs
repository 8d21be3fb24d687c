//! Table of contents layout versions

use crate::error::{ArchiveError, Result};

/// Record layouts found in table of contents streams
///
/// All fields are little-endian signed 32-bit integers with no padding.
///
/// | Version | Size | Byte offset           | Chunk count                  |
/// |---------|------|-----------------------|------------------------------|
/// | V2      | 32   | stored                | stored                       |
/// | V3      | 16   | `chunk_offset * 2048` | stored                       |
/// | V4      | 12   | `chunk_offset * 2048` | `ceil(byte_length / 2048)`   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// Name offset, three reserved words, byte offset, byte length, chunk offset, chunk count
    V2,
    /// Name offset, byte length, chunk offset, chunk count
    V3,
    /// Name offset, byte length, chunk offset
    V4,
}

impl FormatVersion {
    /// Largest record size of any version
    pub const MAX_RECORD_SIZE: usize = 32;

    /// All supported versions
    pub const ALL: [Self; 3] = [Self::V2, Self::V3, Self::V4];

    /// Fixed record size in bytes
    pub const fn record_size(self) -> usize {
        match self {
            Self::V2 => 32,
            Self::V3 => 16,
            Self::V4 => 12,
        }
    }

    /// Whether the byte offset is stored rather than derived from the chunk offset
    pub const fn stores_byte_offset(self) -> bool {
        matches!(self, Self::V2)
    }

    /// Whether the chunk count is stored rather than derived from the byte length
    pub const fn stores_chunk_count(self) -> bool {
        matches!(self, Self::V2 | Self::V3)
    }

    /// Convert to numeric representation
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }

    /// Create from numeric representation
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            4 => Some(Self::V4),
            _ => None,
        }
    }

    /// Create from numeric representation, rejecting unknown layouts
    pub fn try_from_u32(value: u32) -> Result<Self> {
        Self::from_u32(value).ok_or(ArchiveError::UnsupportedVersion(value))
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = ArchiveError;

    fn try_from(value: u32) -> Result<Self> {
        Self::try_from_u32(value)
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{} ({} byte records)", self.to_u32(), self.record_size())
    }
}
