//! Bounded views over the flat data store
//!
//! A [`BoundedView`] exposes `[offset, offset + length)` of a larger stream
//! as a stream of its own. Positions are relative to the window and every
//! read or write is clamped to it, so a view never touches bytes belonging to
//! another entry.
//!
//! The view seeks the underlying stream before each transfer. That makes it
//! safe to run several views one after another over a single shared handle,
//! as long as their transfers do not interleave. Whether the view owns the
//! handle follows from its type parameter: `BoundedView<File>` closes the
//! file when dropped, `BoundedView<&mut File>` leaves it to the caller.

use crate::catalog::ArchiveEntry;
use crate::error::ArchiveError;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Length-capped, independently positioned window over a stream
#[derive(Debug)]
pub struct BoundedView<R> {
    inner: R,
    offset: u64,
    length: u64,
    position: u64,
}

impl<R> BoundedView<R> {
    /// Create a view of `length` bytes starting at absolute `offset`
    pub fn new(inner: R, offset: u64, length: u64) -> Self {
        Self {
            inner,
            offset,
            length,
            position: 0,
        }
    }

    /// Create a view covering a catalog entry
    pub fn for_entry(inner: R, entry: &ArchiveEntry) -> Self {
        Self::new(inner, entry.byte_offset, u64::from(entry.byte_length))
    }

    /// Position relative to the window start
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Window length in bytes
    pub const fn len(&self) -> u64 {
        self.length
    }

    /// Check if the window is empty
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Absolute offset of the window start in the underlying stream
    pub const fn window_offset(&self) -> u64 {
        self.offset
    }

    /// Bytes left between the current position and the window end
    pub const fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.position)
    }

    /// Resize the window; always fails because the window is fixed
    pub fn set_len(&mut self, _length: u64) -> crate::Result<()> {
        Err(ArchiveError::UnsupportedOperation("set_len on a bounded view"))
    }

    /// Borrow the underlying stream
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn clamp(&self, requested: usize) -> usize {
        usize::try_from(self.remaining()).map_or(requested, |left| requested.min(left))
    }
}

impl<R: Seek> BoundedView<R> {
    fn sync_inner(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(self.offset + self.position))?;
        Ok(())
    }
}

impl<R: Read + Seek> Read for BoundedView<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.clamp(buf.len());
        if count == 0 {
            return Ok(0);
        }

        self.sync_inner()?;
        let read = self.inner.read(&mut buf[..count])?;
        self.position += read as u64;
        Ok(read)
    }
}

impl<R: Write + Seek> Write for BoundedView<R> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let count = self.clamp(buf.len());
        if count == 0 {
            return Ok(0);
        }

        self.sync_inner()?;
        let written = self.inner.write(&buf[..count])?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<R> Seek for BoundedView<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => {
                self.position = n;
                return Ok(n);
            }
            SeekFrom::Current(delta) => (self.position, delta),
            SeekFrom::End(delta) => (self.length, delta),
        };

        let Some(target) = base.checked_add_signed(delta) else {
            return Err(ArchiveError::WindowOutOfRange {
                requested: i64::try_from(base)
                    .unwrap_or(i64::MAX)
                    .saturating_add(delta),
                length: self.length,
            }
            .into());
        };

        self.position = target;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
