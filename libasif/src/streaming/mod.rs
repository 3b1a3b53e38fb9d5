//! streaming encode/decode for asif audio
//!
//! packet-at-a-time codec stages that sit on either side of the container
mod decoder;
mod encoder;
mod types;

pub use decoder::SampleDecoder;
pub use encoder::SampleEncoder;
pub use types::{FrameBuffer, PlanarFrame};
