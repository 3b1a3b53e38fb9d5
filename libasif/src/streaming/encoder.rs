use crate::core::{AsifError, AsifResult, Packet, StreamParams};

/// packs planar frames into channel-major packets for the writer
///
/// This is the codec stage in front of the container: it does no delta
/// coding, it only checks layout and stamps timing.
#[derive(Debug, Clone)]
pub struct SampleEncoder {
    params: StreamParams,
    /// samples per channel packed so far
    position: u64,
}

impl SampleEncoder {
    pub fn new(params: StreamParams) -> AsifResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            position: 0,
        })
    }

    pub fn params(&self) -> &StreamParams {
        &self.params
    }

    /// samples per channel packed so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// pack one frame, one slice per channel
    ///
    /// Every plane must have the same length and there must be exactly one
    /// per channel.
    pub fn encode_frame<P: AsRef<[u8]>>(&mut self, planes: &[P]) -> AsifResult<Packet> {
        let channels = self.params.channels as usize;
        let nb_samples = planes.first().map_or(0, |p| p.as_ref().len());
        let total: usize = planes.iter().map(|p| p.as_ref().len()).sum();

        if planes.len() != channels || total != nb_samples * channels {
            return Err(AsifError::MalformedPacket {
                len: total,
                channels,
            });
        }

        let duration = u32::try_from(nb_samples)
            .map_err(|_| AsifError::SampleCountOverflow(nb_samples as u64))?;

        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| AsifError::AllocationFailure { requested: total })?;
        for plane in planes {
            data.extend_from_slice(plane.as_ref());
        }

        let packet = Packet::new(data, self.position, duration);
        self.position += nb_samples as u64;
        Ok(packet)
    }

    /// pack a frame-interleaved buffer (L R L R ...)
    pub fn encode_interleaved(&mut self, samples: &[u8]) -> AsifResult<Packet> {
        let channels = self.params.channels as usize;
        if samples.len() % channels != 0 {
            return Err(AsifError::MalformedPacket {
                len: samples.len(),
                channels,
            });
        }

        let planes: Vec<Vec<u8>> = (0..channels)
            .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
            .collect();
        self.encode_frame(&planes)
    }
}
