//! Positional byte storage the container layer reads and writes through

use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

use crate::core::{AsifError, AsifResult};

/// random-access byte array
///
/// Reads may come back short at end of data; the return value is the
/// number of bytes actually filled.
pub trait RandomAccess {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> AsifResult<usize>;

    fn write_at(&mut self, offset: u64, data: &[u8]) -> AsifResult<()>;

    /// current length in bytes
    fn len(&mut self) -> AsifResult<u64>;

    fn is_empty(&mut self) -> AsifResult<bool> {
        Ok(self.len()? == 0)
    }

    /// whether `write_at` can go back to an earlier offset
    fn is_seekable(&self) -> bool {
        true
    }
}

impl<T: RandomAccess + ?Sized> RandomAccess for &mut T {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> AsifResult<usize> {
        (**self).read_at(offset, buf)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> AsifResult<()> {
        (**self).write_at(offset, data)
    }

    fn len(&mut self) -> AsifResult<u64> {
        (**self).len()
    }

    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
}

// in-memory

/// growable in-memory storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    data: Vec<u8>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        MemoryStorage { data }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl RandomAccess for MemoryStorage {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> AsifResult<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.data.len() => start,
            _ => return Ok(0),
        };
        let count = buf.len().min(self.data.len() - start);
        buf[..count].copy_from_slice(&self.data[start..start + count]);
        Ok(count)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> AsifResult<()> {
        let start = usize::try_from(offset).map_err(|_| AsifError::AllocationFailure {
            requested: usize::MAX,
        })?;
        let end = start
            .checked_add(data.len())
            .ok_or(AsifError::AllocationFailure {
                requested: usize::MAX,
            })?;
        if end > self.data.len() {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| AsifError::AllocationFailure { requested: end })?;
            // gaps read back as zero
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(data);
        Ok(())
    }

    fn len(&mut self) -> AsifResult<u64> {
        Ok(self.data.len() as u64)
    }
}

// seekable streams

/// adapter over anything `Read + Write + Seek` (files, cursors)
#[derive(Debug)]
pub struct StreamStorage<T> {
    inner: T,
}

impl<T> StreamStorage<T> {
    pub fn new(inner: T) -> Self {
        StreamStorage { inner }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read + Write + Seek> RandomAccess for StreamStorage<T> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> AsifResult<usize> {
        self.inner.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> AsifResult<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.write_all(data)?;
        Ok(())
    }

    fn len(&mut self) -> AsifResult<u64> {
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }
}

// forward-only sinks

/// write-only sink that can only append at its current position
///
/// Pipes and sockets end up here. Writing at any other offset fails with
/// `NonSeekableSink`.
#[derive(Debug)]
pub struct ForwardSink<W> {
    inner: W,
    position: u64,
}

impl<W: Write> ForwardSink<W> {
    pub fn new(inner: W) -> Self {
        ForwardSink { inner, position: 0 }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RandomAccess for ForwardSink<W> {
    fn read_at(&mut self, offset: u64, _buf: &mut [u8]) -> AsifResult<usize> {
        Err(AsifError::NonSeekableSink {
            offset,
            position: self.position,
        })
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> AsifResult<()> {
        if offset != self.position {
            return Err(AsifError::NonSeekableSink {
                offset,
                position: self.position,
            });
        }
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    fn len(&mut self) -> AsifResult<u64> {
        Ok(self.position)
    }

    fn is_seekable(&self) -> bool {
        false
    }
}
