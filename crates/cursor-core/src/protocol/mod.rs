//! Protocol module containing the event kinds, the frame type and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_fields, decode_frame, encode_fields, encode_frame, ProtocolError};
pub use messages::*;
