//! Named stream providers
//!
//! The archive reader does not care where its two input streams come from.
//! A [`StreamSource`] opens a stream by name; the disc filesystem layer,
//! a plain directory or an in-memory map can all play that role.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opens named streams for reading
pub trait StreamSource {
    /// Stream type handed out by this source
    type Stream: Read + Seek;

    /// Open the stream called `name`
    fn open_stream(&self, name: &str) -> io::Result<Self::Stream>;
}

impl<S: StreamSource + ?Sized> StreamSource for &S {
    type Stream = S::Stream;

    fn open_stream(&self, name: &str) -> io::Result<Self::Stream> {
        (**self).open_stream(name)
    }
}

/// Streams backed by files below a root directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `root`
    ///
    /// Absolute stream names bypass the root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this source
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StreamSource for DirectorySource {
    type Stream = File;

    fn open_stream(&self, name: &str) -> io::Result<File> {
        File::open(self.root.join(name))
    }
}

/// Streams backed by in-memory buffers
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    streams: HashMap<String, Arc<[u8]>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` under `name`, replacing any previous stream
    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) {
        self.streams.insert(name.into(), data.into());
    }

    /// Builder-style variant of [`MemorySource::insert`]
    pub fn with(mut self, name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        self.insert(name, data);
        self
    }
}

impl StreamSource for MemorySource {
    type Stream = Cursor<Arc<[u8]>>;

    fn open_stream(&self, name: &str) -> io::Result<Self::Stream> {
        self.streams
            .get(name)
            .map(|data| Cursor::new(Arc::clone(data)))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("no stream named {name}"))
            })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_independent_handles() {
        let source = MemorySource::new().with("data", b"abcdef".to_vec());

        let mut first = source.open_stream("data").unwrap();
        let mut second = source.open_stream("data").unwrap();

        let mut buf = [0u8; 3];
        first.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");

        second.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn test_memory_source_missing() {
        let source = MemorySource::new();
        let err = source.open_stream("nope").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("toc.hed"), b"xyz").unwrap();

        let source = DirectorySource::new(dir.path());
        let mut contents = String::new();
        source
            .open_stream("toc.hed")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "xyz");
        assert!(source.open_stream("missing.dat").is_err());
    }
}
