//! Streaming frame types

use crate::core::{AsifError, AsifResult};

/// a writable sample buffer supplied by the host
///
/// The decoder asks for exactly `len` bytes per decode call and fills them
/// channel-major.
pub trait FrameBuffer {
    fn acquire(&mut self, len: usize) -> AsifResult<&mut [u8]>;
}

impl FrameBuffer for Vec<u8> {
    fn acquire(&mut self, len: usize) -> AsifResult<&mut [u8]> {
        if len > self.capacity() {
            self.try_reserve_exact(len - self.len())
                .map_err(|_| AsifError::AllocationFailure { requested: len })?;
        }
        self.resize(len, 0);
        Ok(self.as_mut_slice())
    }
}

impl FrameBuffer for PlanarFrame {
    fn acquire(&mut self, len: usize) -> AsifResult<&mut [u8]> {
        self.data.acquire(len)
    }
}

/// decoded unsigned 8-bit planar samples
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanarFrame {
    /// channel-major samples
    pub data: Vec<u8>,
    pub channels: usize,
    /// samples per channel
    pub nb_samples: usize,
    /// sample position of the first sample in each channel
    pub pts: u64,
}

impl PlanarFrame {
    /// one channel's samples
    pub fn plane(&self, channel: usize) -> Option<&[u8]> {
        if channel >= self.channels {
            return None;
        }
        let start = channel * self.nb_samples;
        self.data.get(start..start + self.nb_samples)
    }

    /// iterate over all planes in channel order
    pub fn planes(&self) -> impl Iterator<Item = &[u8]> {
        // max(1) keeps chunks_exact happy on empty frames
        self.data
            .chunks_exact(self.nb_samples.max(1))
            .take(self.channels)
    }

    /// frame-interleaved copy (L R L R ...)
    pub fn interleaved(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for i in 0..self.nb_samples {
            for ch in 0..self.channels {
                out.push(self.data[ch * self.nb_samples + i]);
            }
        }
        out
    }
}
