//! Writer and reader configuration

use serde::{Deserialize, Serialize};

use crate::core::store::DEFAULT_INITIAL_CAPACITY;
use crate::core::AsifResult;

/// default chunk divisor: rate / 25 is 40 ms of audio per pull
pub const DEFAULT_CHUNK_DIVISOR: u32 = 25;

/// default ceiling on samples per channel per pull
pub const DEFAULT_MAX_CHUNK_SAMPLES: u32 = 1024;

/// when the writer runs the delta transform
///
/// Both produce byte-identical files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeStrategy {
    /// keep raw samples, delta-encode everything at finalize
    Deferred,
    /// delta-encode each packet as it arrives
    #[default]
    Incremental,
}

/// options for [`ContainerWriter`](crate::ContainerWriter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    pub strategy: EncodeStrategy,
    /// starting capacity of each channel store in bytes
    pub initial_capacity: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            strategy: EncodeStrategy::default(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl WriterOptions {
    pub fn deferred() -> Self {
        Self {
            strategy: EncodeStrategy::Deferred,
            ..Default::default()
        }
    }

    pub fn incremental() -> Self {
        Self {
            strategy: EncodeStrategy::Incremental,
            ..Default::default()
        }
    }

    pub fn with_strategy(mut self, strategy: EncodeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// zero is treated as one
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes.max(1);
        self
    }

    pub fn from_json(json: &str) -> AsifResult<Self> {
        let mut options: Self = serde_json::from_str(json)?;
        options.initial_capacity = options.initial_capacity.max(1);
        Ok(options)
    }

    pub fn to_json(&self) -> AsifResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// options for [`ContainerReader`](crate::ContainerReader)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// chunk size is `sample_rate / chunk_divisor`
    pub chunk_divisor: u32,
    /// upper bound on samples per channel per chunk
    pub max_chunk_samples: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            chunk_divisor: DEFAULT_CHUNK_DIVISOR,
            max_chunk_samples: DEFAULT_MAX_CHUNK_SAMPLES,
        }
    }
}

impl ReaderOptions {
    /// zero is treated as one
    pub fn with_chunk_divisor(mut self, divisor: u32) -> Self {
        self.chunk_divisor = divisor.max(1);
        self
    }

    /// zero is treated as one
    pub fn with_max_chunk_samples(mut self, samples: u32) -> Self {
        self.max_chunk_samples = samples.max(1);
        self
    }

    /// fixed chunk size regardless of sample rate
    pub fn fixed(samples: u32) -> Self {
        Self {
            chunk_divisor: 1,
            max_chunk_samples: samples.max(1),
        }
    }

    /// samples per channel per pull for a given rate, before clamping to
    /// what is left in the file
    pub fn chunk_samples(&self, sample_rate: u32) -> u32 {
        let divisor = self.chunk_divisor.max(1);
        let max = self.max_chunk_samples.max(1);
        (sample_rate / divisor).clamp(1, max)
    }

    pub fn from_json(json: &str) -> AsifResult<Self> {
        let options: Self = serde_json::from_str(json)?;
        Ok(Self {
            chunk_divisor: options.chunk_divisor.max(1),
            max_chunk_samples: options.max_chunk_samples.max(1),
        })
    }

    pub fn to_json(&self) -> AsifResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_samples() {
        let options = ReaderOptions::default();
        assert_eq!(options.chunk_samples(8000), 320);
        assert_eq!(options.chunk_samples(44100), 1024);
        assert_eq!(options.chunk_samples(10), 1);
    }

    #[test]
    fn test_fixed_chunk_samples() {
        let options = ReaderOptions::fixed(3);
        assert_eq!(options.chunk_samples(8000), 3);
        assert_eq!(options.chunk_samples(2), 2);
    }

    #[test]
    fn test_reader_options_from_json() {
        let options = ReaderOptions::from_json(r#"{"max_chunk_samples": 0}"#).unwrap();
        assert_eq!(options.chunk_divisor, DEFAULT_CHUNK_DIVISOR);
        assert_eq!(options.max_chunk_samples, 1);
    }

    #[test]
    fn test_writer_options_json_roundtrip() {
        let options = WriterOptions::deferred().with_initial_capacity(16);
        let json = options.to_json().unwrap();
        assert!(json.contains("\"deferred\""));
        assert_eq!(WriterOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = WriterOptions::from_json("{").unwrap_err();
        assert!(matches!(err, crate::AsifError::Config(_)));
    }
}
