//! Chunk addressing for the flat data store
//!
//! Every logical file starts on a chunk boundary. Chunks are fixed at 2048
//! bytes (one optical disc sector) for all table versions.

/// Size of one addressing chunk in bytes
pub const CHUNK_SIZE: u32 = 2048;

/// Byte offset of the chunk at `chunk_index`
pub const fn offset_of(chunk_index: u32) -> u64 {
    chunk_index as u64 * CHUNK_SIZE as u64
}

/// Number of chunks needed to hold `byte_length` bytes
pub const fn chunk_count_of(byte_length: u32) -> u32 {
    byte_length.div_ceil(CHUNK_SIZE)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_offset_of() {
        assert_eq!(offset_of(0), 0);
        assert_eq!(offset_of(1), 2048);
        assert_eq!(offset_of(u32::MAX), u64::from(u32::MAX) * 2048);
    }

    #[test]
    fn test_chunk_count_boundaries() {
        assert_eq!(chunk_count_of(0), 0);
        assert_eq!(chunk_count_of(1), 1);
        assert_eq!(chunk_count_of(2048), 1);
        assert_eq!(chunk_count_of(2049), 2);
        assert_eq!(chunk_count_of(5000), 3);
        assert_eq!(chunk_count_of(u32::MAX), 2_097_152);
    }

    proptest! {
        #[test]
        fn chunk_count_covers_length(byte_length in any::<u32>()) {
            let chunks = chunk_count_of(byte_length);
            prop_assert!(u64::from(chunks) * u64::from(CHUNK_SIZE) >= u64::from(byte_length));
            prop_assert_eq!(
                u64::from(chunks),
                u64::from(byte_length).div_ceil(u64::from(CHUNK_SIZE))
            );
        }

        #[test]
        fn chunk_count_is_tight(byte_length in 1u32..) {
            let chunks = chunk_count_of(byte_length);
            prop_assert!(u64::from(chunks - 1) * u64::from(CHUNK_SIZE) < u64::from(byte_length));
        }
    }
}
