//! common types for asif codec

use super::error::{AsifError, AsifResult};

// constants

/// Magic number "asif"
pub const MAGIC: [u8; 4] = *b"asif";

/// header size (includes magic)
pub const HEADER_SIZE: u64 = 14;

/// byte offset of the sample rate field
pub const SAMPLE_RATE_OFFSET: u64 = 4;

/// byte offset of the channel count field
pub const CHANNELS_OFFSET: u64 = 8;

/// byte offset of the per-channel sample count field
pub const SAMPLE_COUNT_OFFSET: u64 = 10;

/// format version
pub const VERSION_MAJOR: u8 = 1;
pub const VERSION_MINOR: u8 = 0;

// types

/// sample layout handed to and from the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SampleFormat {
    /// unsigned 8-bit, one plane per channel
    U8Planar,
}

/// what a host needs to register an asif stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamParams {
    pub codec_tag: [u8; 4],
    pub sample_format: SampleFormat,
    pub channels: u16,
    pub sample_rate: u32,
}

impl StreamParams {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        StreamParams {
            codec_tag: MAGIC,
            sample_format: SampleFormat::U8Planar,
            channels,
            sample_rate,
        }
    }

    /// reject anything we can't encode
    pub fn validate(&self) -> AsifResult<()> {
        if self.codec_tag != MAGIC {
            return Err(AsifError::UnsupportedFormat(format!(
                "codec tag {:?}",
                String::from_utf8_lossy(&self.codec_tag)
            )));
        }
        if self.sample_rate == 0 {
            return Err(AsifError::InvalidHeader("sample rate is zero".to_string()));
        }
        if self.channels == 0 {
            return Err(AsifError::InvalidHeader("channel count is zero".to_string()));
        }
        Ok(())
    }
}

/// asif file header
///
/// | Offset | Size | Field                      |
/// |--------|------|----------------------------|
/// | 0      | 4    | magic "asif"               |
/// | 4      | 4    | sample rate (u32 LE)       |
/// | 8      | 2    | channel count (u16 LE)     |
/// | 10     | 4    | samples per channel (u32 LE) |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples_per_channel: u32,
}

impl Header {
    pub fn new(sample_rate: u32, channels: u16, samples_per_channel: u32) -> Self {
        Header {
            sample_rate,
            channels,
            samples_per_channel,
        }
    }

    /// serialize to the on-disk layout
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE as usize] {
        let (rate, chans, count) = field_offsets();
        let mut out = [0u8; HEADER_SIZE as usize];
        out[..rate].copy_from_slice(&MAGIC);
        out[rate..chans].copy_from_slice(&self.sample_rate.to_le_bytes());
        out[chans..count].copy_from_slice(&self.channels.to_le_bytes());
        out[count..].copy_from_slice(&self.samples_per_channel.to_le_bytes());
        out
    }

    /// parse and validate a header
    ///
    /// Length is checked before the magic, so a short garbage file reports
    /// `TruncatedHeader` rather than `BadMagic`.
    pub fn parse(data: &[u8]) -> AsifResult<Header> {
        if data.len() < HEADER_SIZE as usize {
            return Err(AsifError::TruncatedHeader {
                available: data.len(),
                required: HEADER_SIZE as usize,
            });
        }

        let found = [data[0], data[1], data[2], data[3]];
        if found != MAGIC {
            return Err(AsifError::BadMagic { found });
        }

        let (rate, chans, count) = field_offsets();
        let header = Header {
            sample_rate: u32::from_le_bytes([
                data[rate],
                data[rate + 1],
                data[rate + 2],
                data[rate + 3],
            ]),
            channels: u16::from_le_bytes([data[chans], data[chans + 1]]),
            samples_per_channel: u32::from_le_bytes([
                data[count],
                data[count + 1],
                data[count + 2],
                data[count + 3],
            ]),
        };
        header.validate()?;
        Ok(header)
    }

    pub fn validate(&self) -> AsifResult<()> {
        if self.sample_rate == 0 {
            return Err(AsifError::InvalidHeader("sample rate is zero".to_string()));
        }
        if self.channels == 0 {
            return Err(AsifError::InvalidHeader("channel count is zero".to_string()));
        }
        if self.samples_per_channel == 0 {
            return Err(AsifError::InvalidHeader("sample count is zero".to_string()));
        }
        Ok(())
    }

    /// file offset of the first byte of channel `channel`
    pub fn channel_offset(&self, channel: u16) -> u64 {
        channel_offset(channel, self.samples_per_channel)
    }

    /// total file length implied by the header
    pub fn file_len(&self) -> u64 {
        HEADER_SIZE + self.channels as u64 * self.samples_per_channel as u64
    }

    /// duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_per_channel as f64 / self.sample_rate as f64
    }

    pub fn stream_params(&self) -> StreamParams {
        StreamParams::new(self.sample_rate, self.channels)
    }
}

// header field positions as slice indices
fn field_offsets() -> (usize, usize, usize) {
    (
        SAMPLE_RATE_OFFSET as usize,
        CHANNELS_OFFSET as usize,
        SAMPLE_COUNT_OFFSET as usize,
    )
}

/// start of a channel region for a given per-channel sample count
#[inline]
pub fn channel_offset(channel: u16, samples_per_channel: u32) -> u64 {
    HEADER_SIZE + channel as u64 * samples_per_channel as u64
}

/// a chunk of channel-major sample bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// channel-major payload
    pub data: Vec<u8>,
    /// sample position of the first sample in each channel
    pub pts: u64,
    /// samples per channel
    pub duration: u32,
}

impl Packet {
    pub fn new(data: Vec<u8>, pts: u64, duration: u32) -> Self {
        Packet {
            data,
            pts,
            duration,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// one channel's run inside the payload
    pub fn channel(&self, channel: usize) -> Option<&[u8]> {
        let run = self.duration as usize;
        let start = channel.checked_mul(run)?;
        let end = start.checked_add(run)?;
        self.data.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = Header::new(44100, 2, 0x0102_0304).to_bytes();
        assert_eq!(&bytes[0..4], b"asif");
        assert_eq!(&bytes[4..8], &44100u32.to_le_bytes());
        assert_eq!(&bytes[8..10], &[2, 0]);
        assert_eq!(&bytes[10..14], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_channel_offsets() {
        let header = Header::new(8000, 3, 100);
        assert_eq!(header.channel_offset(0), 14);
        assert_eq!(header.channel_offset(1), 114);
        assert_eq!(header.channel_offset(2), 214);
        assert_eq!(header.file_len(), 314);
    }

    #[test]
    fn test_zero_fields_rejected() {
        for header in [
            Header::new(0, 1, 1),
            Header::new(1, 0, 1),
            Header::new(1, 1, 0),
        ] {
            let err = Header::parse(&header.to_bytes()).unwrap_err();
            assert!(matches!(err, AsifError::InvalidHeader(_)), "{err}");
        }
    }

    #[test]
    fn test_stream_params_validation() {
        assert!(StreamParams::new(8000, 1).validate().is_ok());

        let mut params = StreamParams::new(8000, 1);
        params.codec_tag = *b"wave";
        assert!(matches!(
            params.validate(),
            Err(AsifError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_packet_channel_runs() {
        let packet = Packet::new(vec![1, 2, 3, 4, 5, 6], 0, 3);
        assert_eq!(packet.channel(0), Some(&[1, 2, 3][..]));
        assert_eq!(packet.channel(1), Some(&[4, 5, 6][..]));
        assert_eq!(packet.channel(2), None);
    }

    #[test]
    fn test_packet_channel_far_out_of_range() {
        let packet = Packet::new(vec![1, 2], 0, 2);
        assert_eq!(packet.channel(usize::MAX / 2), None);
        assert_eq!(packet.channel(usize::MAX), None);
    }

    #[test]
    fn test_fields_sit_at_their_offsets() {
        let bytes = Header::new(0x0A0B_0C0D, 0x0E0F, 7).to_bytes();
        let rate = SAMPLE_RATE_OFFSET as usize;
        let chans = CHANNELS_OFFSET as usize;
        assert_eq!(&bytes[rate..rate + 4], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&bytes[chans..chans + 2], &[0x0F, 0x0E]);
        assert_eq!(Header::parse(&bytes).unwrap(), Header::new(0x0A0B_0C0D, 0x0E0F, 7));
    }
}
