//! File name resolution
//!
//! Names are not stored inline in the records. Each record points at a
//! null-terminated byte run elsewhere in the same table stream, so resolving
//! a name means seeking away from the scan position and coming back.
//!
//! Names are either 7-bit clean or encoded in a double-byte legacy codepage
//! (CP932 / Shift-JIS). The encoding is detected per name.

use crate::error::{ArchiveError, Result};
use encoding_rs::Encoding;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

/// Default label of the legacy codepage used by asset names
pub const DEFAULT_CODEPAGE: &str = "shift_jis";

/// Resolved legacy codepage used for non-ASCII names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyCodepage {
    encoding: &'static Encoding,
}

impl LegacyCodepage {
    /// Look up a codepage by its WHATWG label (e.g. `shift_jis`, `windows-31j`)
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| ArchiveError::EncodingUnavailable(label.to_string()))
    }

    /// Canonical name of the codepage
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode `bytes`, failing on any malformed sequence
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(std::borrow::Cow::into_owned)
    }
}

impl Default for LegacyCodepage {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::SHIFT_JIS,
        }
    }
}

/// Reads null-terminated names out of a stream that is being scanned
#[derive(Debug, Clone)]
pub struct NameResolver {
    codepage: LegacyCodepage,
    scratch: Vec<u8>,
}

impl NameResolver {
    /// Create a resolver decoding non-ASCII names with `codepage`
    pub fn new(codepage: LegacyCodepage) -> Self {
        Self {
            codepage,
            scratch: Vec::with_capacity(64),
        }
    }

    /// Codepage used for non-ASCII names
    pub const fn codepage(&self) -> LegacyCodepage {
        self.codepage
    }

    /// Resolve the name stored at `offset`
    ///
    /// Reads until a zero byte or end of stream. The stream position is
    /// restored before returning, including when reading or decoding fails.
    /// An empty string is a valid result.
    pub fn resolve<R: Read + Seek>(&mut self, stream: &mut R, offset: u64) -> Result<String> {
        let saved = stream.stream_position()?;
        let result = self.read_name(stream, offset);
        let restored = stream.seek(SeekFrom::Start(saved));

        let name = result?;
        restored?;
        Ok(name)
    }

    fn read_name<R: Read + Seek>(&mut self, stream: &mut R, offset: u64) -> Result<String> {
        stream.seek(SeekFrom::Start(offset))?;
        self.scratch.clear();

        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(0) => break,
                Ok(_) if byte[0] == 0 => break,
                Ok(_) => self.scratch.push(byte[0]),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.decode(offset)
    }

    fn decode(&self, offset: u64) -> Result<String> {
        // No zero bytes can be in the scratch buffer, so ASCII here means 1..=127
        if self.scratch.is_ascii() {
            return Ok(self.scratch.iter().map(|&b| char::from(b)).collect());
        }

        self.codepage
            .decode(&self.scratch)
            .ok_or(ArchiveError::NameDecode {
                offset,
                codepage: self.codepage.name(),
            })
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(LegacyCodepage::default())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn stream_with_name_at(offset: usize, name: &[u8]) -> Cursor<Vec<u8>> {
        let mut data = vec![0xEEu8; offset];
        data.extend_from_slice(name);
        Cursor::new(data)
    }

    #[test]
    fn test_ascii_name() {
        let mut stream = stream_with_name_at(8, &[0x41, 0x42, 0x00]);
        let mut resolver = NameResolver::default();

        let name = resolver.resolve(&mut stream, 8).expect("resolve");
        assert_eq!(name, "AB");
    }

    #[test]
    fn test_shift_jis_name() {
        let mut stream = stream_with_name_at(4, &[0x82, 0xA0, 0x00]);
        let mut resolver = NameResolver::default();

        let name = resolver.resolve(&mut stream, 4).expect("resolve");
        assert_eq!(name, "\u{3042}");
    }

    #[test]
    fn test_mixed_name_uses_codepage() {
        let mut name = b"data/".to_vec();
        name.extend_from_slice(&[0x83, 0x65, 0x83, 0x58, 0x83, 0x67]);
        name.extend_from_slice(b".bin\0");
        let mut stream = stream_with_name_at(0, &name);
        let mut resolver = NameResolver::default();

        let resolved = resolver.resolve(&mut stream, 0).expect("resolve");
        assert_eq!(resolved, "data/\u{30C6}\u{30B9}\u{30C8}.bin");
    }

    #[test]
    fn test_unterminated_name_reads_to_end() {
        let mut stream = stream_with_name_at(2, b"tail");
        let mut resolver = NameResolver::default();

        assert_eq!(resolver.resolve(&mut stream, 2).expect("resolve"), "tail");
    }

    #[test]
    fn test_empty_name() {
        let mut stream = stream_with_name_at(3, &[0x00, 0x41]);
        let mut resolver = NameResolver::default();
        assert_eq!(resolver.resolve(&mut stream, 3).expect("resolve"), "");

        // Past the end of the stream is also an empty name
        assert_eq!(resolver.resolve(&mut stream, 1000).expect("resolve"), "");
    }

    #[test]
    fn test_invalid_codepage_bytes_are_reported() {
        // 0x82 followed by a terminator is an incomplete double-byte sequence
        let mut stream = stream_with_name_at(6, &[0x41, 0x82, 0x00]);
        stream.set_position(2);
        let mut resolver = NameResolver::default();

        let result = resolver.resolve(&mut stream, 6);
        assert!(matches!(
            result,
            Err(ArchiveError::NameDecode { offset: 6, .. })
        ));
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn test_unknown_codepage_label() {
        assert!(matches!(
            LegacyCodepage::from_label("not-a-codepage"),
            Err(ArchiveError::EncodingUnavailable(_))
        ));

        let codepage = LegacyCodepage::from_label("windows-31j").expect("known label");
        assert_eq!(codepage, LegacyCodepage::default());
        assert_eq!(codepage.name(), "Shift_JIS");
    }

    proptest! {
        #[test]
        fn resolve_restores_position(
            data in prop::collection::vec(any::<u8>(), 0..256),
            start in 0u64..300,
            offset in 0u64..300,
        ) {
            let mut stream = Cursor::new(data);
            stream.set_position(start);
            let mut resolver = NameResolver::default();

            let _ = resolver.resolve(&mut stream, offset);
            prop_assert_eq!(stream.position(), start);
        }
    }
}
