use log::{debug, warn};

use crate::core::delta::{encode_channel_bytes, DeltaEncoder};
use crate::core::store::ChannelStore;
use crate::core::{
    channel_offset, AsifError, AsifResult, Header, StreamParams, SAMPLE_COUNT_OFFSET,
};
use crate::options::{EncodeStrategy, WriterOptions};
use crate::storage::RandomAccess;

/// where a writer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    HeaderReserved,
    Accumulating,
    Finalized,
}

/// what finalize wrote
#[derive(Debug)]
pub struct Finalized<S> {
    /// the storage, handed back
    pub storage: S,
    pub header: Header,
    /// false when the sink could not seek back to the sample count field
    pub header_patched: bool,
}

/// one channel's accumulation state
#[derive(Debug)]
struct ChannelSlot {
    store: ChannelStore,
    encoder: DeltaEncoder,
}

/// asif container writer
///
/// Writes a placeholder header up front, keeps every channel in its own
/// growable store while packets arrive, and lays the planar regions out
/// on finalize once the per-channel sample count is known.
#[derive(Debug)]
pub struct ContainerWriter<S: RandomAccess> {
    storage: S,
    sample_rate: u32,
    channels: u16,
    options: WriterOptions,
    slots: Vec<ChannelSlot>,
    samples: u64,
    state: WriterState,
}

impl<S: RandomAccess> ContainerWriter<S> {
    /// open with default options
    pub fn open(storage: S, sample_rate: u32, channels: u16) -> AsifResult<Self> {
        Self::open_with(storage, sample_rate, channels, WriterOptions::default())
    }

    pub fn open_with(
        storage: S,
        sample_rate: u32,
        channels: u16,
        options: WriterOptions,
    ) -> AsifResult<Self> {
        let mut writer = ContainerWriter {
            storage,
            sample_rate,
            channels,
            options,
            slots: Vec::new(),
            samples: 0,
            state: WriterState::Created,
        };
        writer.stream_params().validate()?;
        writer.write_header()?;
        writer.allocate_channels()?;
        Ok(writer)
    }

    /// open from host stream params
    pub fn from_params(
        storage: S,
        params: &StreamParams,
        options: WriterOptions,
    ) -> AsifResult<Self> {
        params.validate()?;
        Self::open_with(storage, params.sample_rate, params.channels, options)
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// samples per channel accepted so far
    pub fn samples_per_channel(&self) -> u64 {
        self.samples
    }

    pub fn options(&self) -> &WriterOptions {
        &self.options
    }

    pub fn stream_params(&self) -> StreamParams {
        StreamParams::new(self.sample_rate, self.channels)
    }

    /// accept one channel-major packet of raw samples
    ///
    /// On any error no channel store is modified.
    pub fn write_packet(&mut self, planar: &[u8]) -> AsifResult<()> {
        let channels = self.channels as usize;
        if planar.len() % channels != 0 {
            return Err(AsifError::MalformedPacket {
                len: planar.len(),
                channels,
            });
        }

        let run = planar.len() / channels;
        if run == 0 {
            return Ok(());
        }

        let total = self.samples + run as u64;
        if total > u32::MAX as u64 {
            return Err(AsifError::SampleCountOverflow(total));
        }

        // grow every channel first so a failed allocation leaves none touched
        for slot in &mut self.slots {
            slot.store.reserve(run)?;
        }

        for (slot, samples) in self.slots.iter_mut().zip(planar.chunks_exact(run)) {
            match self.options.strategy {
                EncodeStrategy::Deferred => slot.store.append(samples)?,
                EncodeStrategy::Incremental => {
                    slot.encoder.push_all(samples, slot.store.buffer_mut())
                }
            }
        }

        self.samples = total;
        Ok(())
    }

    /// lay out channel regions and backpatch the sample count
    ///
    /// Consumes the writer, so channel stores are released whether this
    /// succeeds or not. A sink that cannot seek back only loses the
    /// backpatch; the placeholder count of zero stays in the header.
    pub fn finalize(mut self) -> AsifResult<Finalized<S>> {
        let samples = self.samples as u32;
        let header = Header::new(self.sample_rate, self.channels, samples);

        if samples == 0 {
            warn!("finalizing asif stream with no samples");
        }

        let strategy = self.options.strategy;
        let mut region = Vec::new();
        for (ch, slot) in self.slots.iter_mut().enumerate() {
            let offset = channel_offset(ch as u16, samples);
            match strategy {
                EncodeStrategy::Deferred => {
                    region.clear();
                    region
                        .try_reserve(slot.store.len())
                        .map_err(|_| AsifError::AllocationFailure {
                            requested: slot.store.len(),
                        })?;
                    encode_channel_bytes(slot.store.snapshot(), &mut region);
                    self.storage.write_at(offset, &region)?;
                }
                EncodeStrategy::Incremental => {
                    self.storage.write_at(offset, slot.store.snapshot())?;
                }
            }
            // free as we go
            slot.store.take();
        }
        self.slots.clear();

        let header_patched = self.patch_sample_count(samples)?;
        self.state = WriterState::Finalized;

        debug!(
            "finalized asif: {} Hz, {} channels, {} samples per channel, header patched: {}",
            self.sample_rate, self.channels, samples, header_patched
        );

        Ok(Finalized {
            storage: self.storage,
            header,
            header_patched,
        })
    }

    // internal stuff

    fn write_header(&mut self) -> AsifResult<()> {
        let placeholder = Header::new(self.sample_rate, self.channels, 0);
        self.storage.write_at(0, &placeholder.to_bytes())?;
        self.state = WriterState::HeaderReserved;
        debug!(
            "reserved asif header: {} Hz, {} channels",
            self.sample_rate, self.channels
        );
        Ok(())
    }

    fn allocate_channels(&mut self) -> AsifResult<()> {
        let channels = self.channels as usize;
        self.slots
            .try_reserve_exact(channels)
            .map_err(|_| AsifError::AllocationFailure {
                requested: channels,
            })?;
        for _ in 0..channels {
            self.slots.push(ChannelSlot {
                store: ChannelStore::with_capacity(self.options.initial_capacity),
                encoder: DeltaEncoder::new(),
            });
        }
        self.state = WriterState::Accumulating;
        Ok(())
    }

    /// returns whether the count was written
    fn patch_sample_count(&mut self, samples: u32) -> AsifResult<bool> {
        if !self.storage.is_seekable() {
            warn!(
                "asif sink is not seekable, sample count left as placeholder ({} samples written)",
                samples
            );
            return Ok(false);
        }

        match self
            .storage
            .write_at(SAMPLE_COUNT_OFFSET, &samples.to_le_bytes())
        {
            Ok(()) => Ok(true),
            Err(AsifError::NonSeekableSink { offset, position }) => {
                warn!(
                    "asif sink refused seek to {} (at {}), sample count left as placeholder",
                    offset, position
                );
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
