use crate::core::delta::DeltaDecoder;
use crate::core::{AsifError, AsifResult, Packet, StreamParams};

use super::types::{FrameBuffer, PlanarFrame};

/// turns channel-major delta packets back into absolute samples
///
/// Keeps one running value per channel across packets, so packets must be
/// fed in stream order starting from the first one.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    states: Vec<DeltaDecoder>,
    /// samples per channel decoded so far
    position: u64,
}

impl SampleDecoder {
    pub fn new(channels: u16) -> AsifResult<Self> {
        if channels == 0 {
            return Err(AsifError::InvalidHeader("channel count is zero".to_string()));
        }
        Ok(Self {
            states: vec![DeltaDecoder::new(); channels as usize],
            position: 0,
        })
    }

    /// decoder for a stream registered with the host
    pub fn from_params(params: &StreamParams) -> AsifResult<Self> {
        params.validate()?;
        Self::new(params.channels)
    }

    pub fn channels(&self) -> usize {
        self.states.len()
    }

    /// samples per channel decoded so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// decode a packet payload into `out`
    ///
    /// Returns the number of samples per channel written.
    pub fn decode_into<B: FrameBuffer + ?Sized>(
        &mut self,
        payload: &[u8],
        out: &mut B,
    ) -> AsifResult<usize> {
        let channels = self.states.len();
        if payload.len() % channels != 0 {
            return Err(AsifError::MalformedPacket {
                len: payload.len(),
                channels,
            });
        }

        let run = payload.len() / channels;
        let dst = out.acquire(payload.len())?;
        if run == 0 {
            return Ok(0);
        }

        for ((state, src), plane) in self
            .states
            .iter_mut()
            .zip(payload.chunks_exact(run))
            .zip(dst.chunks_exact_mut(run))
        {
            for (sample, &stored) in plane.iter_mut().zip(src) {
                *sample = state.push(stored);
            }
        }

        self.position += run as u64;
        Ok(run)
    }

    /// decode a packet into a fresh frame
    pub fn decode(&mut self, packet: &Packet) -> AsifResult<PlanarFrame> {
        let mut frame = PlanarFrame {
            channels: self.states.len(),
            pts: packet.pts,
            ..Default::default()
        };
        frame.nb_samples = self.decode_into(&packet.data, &mut frame.data)?;
        Ok(frame)
    }

    /// forget all running values for reuse on a new stream
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
        self.position = 0;
    }
}
