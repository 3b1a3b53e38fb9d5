//! Error types for asif

use std::io;
use thiserror::Error;

/// asif error type
#[derive(Error, Debug)]
pub enum AsifError {
    /// first four bytes are not "asif"
    #[error("Invalid asif file: bad magic {found:?}")]
    BadMagic { found: [u8; 4] },

    /// header parsed but a field is zero
    #[error("Invalid asif header: {0}")]
    InvalidHeader(String),

    /// fewer than 14 header bytes available
    #[error("Truncated header: got {available} of {required} bytes")]
    TruncatedHeader { available: usize, required: usize },

    /// a channel region is shorter than the header promises
    #[error("Truncated data at offset {offset}: expected {expected} bytes, got {available}")]
    TruncatedData {
        offset: u64,
        expected: usize,
        available: usize,
    },

    /// packet length does not split into equal per-channel runs
    #[error("Malformed packet: {len} bytes is not divisible by {channels} channels")]
    MalformedPacket { len: usize, channels: usize },

    /// a channel buffer could not grow
    #[error("Allocation failure: could not grow buffer to {requested} bytes")]
    AllocationFailure { requested: usize },

    /// the sink cannot seek back to the requested offset
    #[error("Sink is not seekable (requested offset {offset}, position {position})")]
    NonSeekableSink { offset: u64, position: u64 },

    /// more samples per channel than the header field can hold
    #[error("Sample count overflow: {0} samples per channel exceeds u32")]
    SampleCountOverflow(u64),

    /// stream params that are not asif / u8 planar
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// normal end of a chunked pull, for callers that want it as an error
    #[error("End of stream")]
    EndOfStream,

    /// options could not be parsed
    #[error("Invalid options: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error from the underlying storage
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// result type for asif stuff
pub type AsifResult<T> = Result<T, AsifError>;

impl AsifError {
    /// true for the normal end-of-stream signal
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, AsifError::EndOfStream)
    }
}
