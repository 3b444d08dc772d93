//! Telemetry frame types and wire-format handling
//!
//! - `reading`: the decoded 8-channel frame and its encoding tag
//! - `decoder`: tolerant multi-format payload decoding
//! - `validator`: well-formedness check for free-text telemetry lines

pub mod decoder;
pub mod reading;
pub mod validator;

pub use decoder::{decode, decode_raw, DecodeFailure, Payload};
pub use reading::{ChannelReading, Encoding, Side, CHANNEL_COUNT};
pub use validator::is_well_formed;
