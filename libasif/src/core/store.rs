//! Growable per-channel byte store used on the write path

use super::error::{AsifError, AsifResult};

/// starting capacity when none is given
pub const DEFAULT_INITIAL_CAPACITY: usize = 1024;

/// append-only byte buffer that doubles its capacity when full
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    buffer: Vec<u8>,
    initial_capacity: usize,
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// capacity is allocated lazily on the first append
    pub fn with_capacity(initial_capacity: usize) -> Self {
        ChannelStore {
            buffer: Vec::new(),
            initial_capacity: initial_capacity.max(1),
        }
    }

    /// make room for `additional` more bytes without writing any
    pub fn reserve(&mut self, additional: usize) -> AsifResult<()> {
        let needed = self
            .buffer
            .len()
            .checked_add(additional)
            .ok_or(AsifError::AllocationFailure {
                requested: usize::MAX,
            })?;
        if needed <= self.buffer.capacity() {
            return Ok(());
        }

        let mut target = self.buffer.capacity().max(self.initial_capacity);
        while target < needed {
            target = target.checked_mul(2).ok_or(AsifError::AllocationFailure {
                requested: needed,
            })?;
        }

        self.buffer
            .try_reserve_exact(target - self.buffer.len())
            .map_err(|_| AsifError::AllocationFailure { requested: target })
    }

    /// append bytes, growing by doubling
    pub fn append(&mut self, bytes: &[u8]) -> AsifResult<()> {
        self.reserve(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    /// everything written so far
    pub fn snapshot(&self) -> &[u8] {
        &self.buffer
    }

    /// mutable tail access for encoders writing in place
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// hand the bytes over and leave the store empty
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_allocation() {
        let store = ChannelStore::with_capacity(4);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 0);
    }

    #[test]
    fn test_capacity_doubles() {
        let mut store = ChannelStore::with_capacity(4);
        store.append(&[1, 2, 3]).unwrap();
        assert!(store.capacity() >= 4);

        let before = store.capacity();
        store.append(&[4, 5, 6, 7, 8]).unwrap();
        assert!(store.capacity() >= before * 2);
        assert_eq!(store.snapshot(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_large_append_skips_ahead() {
        let mut store = ChannelStore::with_capacity(1);
        store.append(&[7u8; 1000]).unwrap();
        assert_eq!(store.len(), 1000);
        assert!(store.capacity() >= 1024);
    }

    #[test]
    fn test_reserve_does_not_write() {
        let mut store = ChannelStore::with_capacity(2);
        store.reserve(100).unwrap();
        assert!(store.is_empty());
        assert!(store.capacity() >= 100);
    }

    #[test]
    fn test_take_empties() {
        let mut store = ChannelStore::new();
        store.append(b"abc").unwrap();
        assert_eq!(store.take(), b"abc".to_vec());
        assert!(store.is_empty());
    }
}
