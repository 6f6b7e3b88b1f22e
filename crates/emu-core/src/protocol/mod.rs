//! Protocol module containing the device-event types, numeric normalization,
//! the emulator's protobuf messages and the codec between them.

pub mod codec;
pub mod messages;
pub mod normalize;
pub mod wire;

pub use codec::{decode_event, encode_event, ProtocolError};
pub use messages::*;
pub use normalize::{normalize_pressure, scale_coordinate};
