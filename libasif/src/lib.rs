use wasm_bindgen::prelude::*;

pub mod core;
pub mod options;
pub mod storage;
pub mod streaming;

mod reader;
mod writer;

pub use crate::core::{
    decode_channel, encode_channel, AsifError, AsifResult, ChannelStore, DeltaDecoder,
    DeltaEncoder, EncodedChannel, Header, Packet, SampleFormat, StreamParams, HEADER_SIZE, MAGIC,
    VERSION_MAJOR, VERSION_MINOR,
};
pub use options::{EncodeStrategy, ReaderOptions, WriterOptions};
pub use reader::{Chunks, ContainerReader};
pub use storage::{ForwardSink, MemoryStorage, RandomAccess, StreamStorage};
pub use streaming::{FrameBuffer, PlanarFrame, SampleDecoder, SampleEncoder};
pub use writer::{ContainerWriter, Finalized, WriterState};

// audio info for the info() function

/// info about an asif file
#[wasm_bindgen]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Samples in each channel
    pub samples_per_channel: u32,
    /// Duration in seconds
    pub duration_secs: f64,
    /// File size in bytes
    pub file_size: usize,
    /// Does the file length match 14 + channels * samples?
    pub size_valid: bool,
}

// result helpers

/// turn an error into js
fn to_js_err(e: AsifError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// api functions

/// encode planar samples to asif
///
/// # Arguments
/// * `planar` - Channel-major unsigned 8-bit samples, one equal-length run per channel
/// * `sample_rate` - Sample rate in Hz (e.g., 8000)
/// * `channels` - Number of channels
///
/// # Returns
/// asif file as byte array
#[wasm_bindgen]
pub fn encode(planar: &[u8], sample_rate: u32, channels: u16) -> Result<Vec<u8>, JsValue> {
    encode_bytes(planar, sample_rate, channels).map_err(to_js_err)
}

/// native form of [`encode`]
pub fn encode_bytes(planar: &[u8], sample_rate: u32, channels: u16) -> AsifResult<Vec<u8>> {
    let mut writer = ContainerWriter::open(MemoryStorage::new(), sample_rate, channels)?;
    writer.write_packet(planar)?;
    Ok(writer.finalize()?.storage.into_inner())
}

/// decode asif to planar samples
///
/// # Arguments
/// * `data` - asif file bytes
///
/// # Returns
/// Channel-major unsigned 8-bit samples
#[wasm_bindgen]
pub fn decode(data: &[u8]) -> Result<Vec<u8>, JsValue> {
    decode_bytes(data).map_err(to_js_err)
}

/// native form of [`decode`]
pub fn decode_bytes(data: &[u8]) -> AsifResult<Vec<u8>> {
    let mut reader = ContainerReader::open(MemoryStorage::from_vec(data.to_vec()))?;
    let header = *reader.header();
    let per_channel = header.samples_per_channel as usize;

    // the header alone can claim gigabytes; check the body is really there
    let body = header.file_len() - HEADER_SIZE;
    let available = data.len().saturating_sub(HEADER_SIZE as usize);
    if body > available as u64 {
        return Err(AsifError::TruncatedData {
            offset: HEADER_SIZE,
            expected: usize::try_from(body).unwrap_or(usize::MAX),
            available,
        });
    }

    let total = per_channel
        .checked_mul(header.channels as usize)
        .ok_or(AsifError::AllocationFailure {
            requested: usize::MAX,
        })?;
    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| AsifError::AllocationFailure { requested: total })?;
    out.resize(total, 0);

    let mut decoder = SampleDecoder::new(header.channels)?;
    let mut scratch = Vec::new();

    // chunks are channel-major, the output is whole planes
    while let Some(packet) = reader.read_chunk()? {
        let run = decoder.decode_into(&packet.data, &mut scratch)?;
        let start = packet.pts as usize;
        for (ch, plane) in scratch.chunks_exact(run).enumerate() {
            let base = ch * per_channel + start;
            out[base..base + run].copy_from_slice(plane);
        }
    }

    Ok(out)
}

/// Validate asif file integrity
///
/// # Arguments
/// * `data` - asif file bytes
///
/// # Returns
/// true if the header parses and the file length matches it
#[wasm_bindgen]
pub fn validate(data: &[u8]) -> bool {
    match Header::parse(data) {
        Ok(header) => header.file_len() == data.len() as u64,
        Err(_) => false,
    }
}

/// Get information about an asif file
///
/// # Arguments
/// * `data` - asif file bytes
///
/// # Returns
/// AudioInfo struct with file details
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<AudioInfo, JsValue> {
    read_info(data).map_err(to_js_err)
}

/// native form of [`info`]
pub fn read_info(data: &[u8]) -> AsifResult<AudioInfo> {
    let header = Header::parse(data)?;
    Ok(AudioInfo {
        sample_rate: header.sample_rate,
        channels: header.channels,
        samples_per_channel: header.samples_per_channel,
        duration_secs: header.duration_secs(),
        file_size: data.len(),
        size_valid: header.file_len() == data.len() as u64,
    })
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    format!("{}.{}", VERSION_MAJOR, VERSION_MINOR)
}
