pub mod delta;
pub mod error;
pub mod store;
pub mod types;

pub use delta::{
    clamp_delta, decode_channel, decode_stream, encode_channel, encode_channel_bytes,
    DecodeStream, DeltaDecoder, DeltaEncoder, EncodedChannel,
};
pub use error::{AsifError, AsifResult};
pub use store::ChannelStore;
pub use types::*;
