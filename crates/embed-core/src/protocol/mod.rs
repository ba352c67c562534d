//! Protocol module containing the wire message types and the inbound filter codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_message, encode_command, encode_message, ProtocolError};
pub use messages::*;
