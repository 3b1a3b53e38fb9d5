//! Drift-compensated delta coding for 8-bit channels
//!
//! Each stored delta is clamped to `[-128, 127]`. Whatever the clamp cuts off
//! is carried into the next difference, so a decoder that only sums deltas
//! with wrapping arithmetic lands back on the true sample as soon as the
//! carry drains to zero. While it is non-zero the decoded value is off by
//! exactly the carry (mod 256).

/// smallest storable delta
pub const DELTA_MIN: i32 = i8::MIN as i32;

/// largest storable delta
pub const DELTA_MAX: i32 = i8::MAX as i32;

/// one channel after encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChannel {
    /// absolute first sample
    pub first: u8,
    /// `len - 1` clamped differences
    pub deltas: Vec<i8>,
}

impl EncodedChannel {
    /// number of samples this channel decodes to
    pub fn sample_count(&self) -> usize {
        self.deltas.len() + 1
    }

    /// on-disk region bytes: first sample then deltas as raw bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.sample_count());
        out.push(self.first);
        out.extend(self.deltas.iter().map(|&d| d as u8));
        out
    }
}

/// clamp a difference, returning (stored, carry)
#[inline]
pub fn clamp_delta(diff: i32) -> (i8, i32) {
    if diff < DELTA_MIN {
        (i8::MIN, diff - DELTA_MIN)
    } else if diff > DELTA_MAX {
        (i8::MAX, diff - DELTA_MAX)
    } else {
        (diff as i8, 0)
    }
}

/// incremental encoder state for one channel
///
/// Feeding samples one at a time produces the same bytes as
/// [`encode_channel`] over the whole history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaEncoder {
    previous: Option<u8>,
    carry: i32,
}

impl DeltaEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// encode one sample into its stored byte
    ///
    /// The first sample is stored as-is; every later one as a clamped delta
    /// reinterpreted as `u8`.
    #[inline]
    pub fn push(&mut self, sample: u8) -> u8 {
        match self.previous.replace(sample) {
            None => sample,
            Some(prev) => {
                let diff = sample as i32 - prev as i32 + self.carry;
                let (stored, carry) = clamp_delta(diff);
                self.carry = carry;
                stored as u8
            }
        }
    }

    /// encode a run, appending stored bytes to `out`
    pub fn push_all(&mut self, samples: &[u8], out: &mut Vec<u8>) {
        out.reserve(samples.len());
        for &s in samples {
            out.push(self.push(s));
        }
    }

    /// remainder not yet represented in the stored deltas
    pub fn carry(&self) -> i32 {
        self.carry
    }

    /// last raw sample seen
    pub fn previous(&self) -> Option<u8> {
        self.previous
    }
}

/// streaming decoder state for one channel
///
/// Starts at zero, so the stored first sample is consumed like any other
/// byte and comes out as itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaDecoder {
    previous: u8,
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, stored: u8) -> u8 {
        self.previous = self.previous.wrapping_add(stored);
        self.previous
    }

    pub fn previous(&self) -> u8 {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = 0;
    }
}

/// encode a whole channel, `None` if it has no samples
pub fn encode_channel(samples: &[u8]) -> Option<EncodedChannel> {
    let (&first, rest) = samples.split_first()?;

    let mut encoder = DeltaEncoder::new();
    encoder.push(first);
    let deltas = rest.iter().map(|&s| encoder.push(s) as i8).collect();

    Some(EncodedChannel { first, deltas })
}

/// encode a whole channel straight into its region bytes
pub fn encode_channel_bytes(samples: &[u8], out: &mut Vec<u8>) {
    DeltaEncoder::new().push_all(samples, out);
}

/// decode a whole channel
pub fn decode_channel(first: u8, deltas: &[i8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(deltas.len() + 1);
    out.push(first);
    let mut prev = first;
    for &d in deltas {
        prev = prev.wrapping_add(d as u8);
        out.push(prev);
    }
    out
}

/// lazily decode region bytes (first sample followed by deltas)
pub fn decode_stream<I>(stored: I) -> DecodeStream<I::IntoIter>
where
    I: IntoIterator<Item = u8>,
{
    DecodeStream {
        inner: stored.into_iter(),
        state: DeltaDecoder::new(),
    }
}

/// iterator returned by [`decode_stream`]
#[derive(Debug, Clone)]
pub struct DecodeStream<I> {
    inner: I,
    state: DeltaDecoder,
}

impl<I: Iterator<Item = u8>> Iterator for DecodeStream<I> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let stored = self.inner.next()?;
        Some(self.state.push(stored))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
