//! Alarm-server wire protocol.
//!
//! Cameras push one notification per line: a fixed 20-byte vendor header
//! followed by a JSON payload describing the alarm.

pub mod address;
pub mod messages;

pub use address::decode_address;
pub use messages::{parse_message, parse_message_lossy, AlarmEvent};

/// Vendor session/header bytes in front of every payload
pub const PREFIX_LEN: usize = 20;

/// Hex characters that carry the IPv4 address inside the address token
pub const ADDRESS_HEX_LEN: usize = 8;

/// Event type and status that mean "motion started"
pub const EVENT_MOTION_DETECT: &str = "MotionDetect";
pub const STATUS_START: &str = "Start";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {len} bytes, expected at least {}", PREFIX_LEN)]
    MalformedMessage { len: usize },

    #[error("invalid alarm payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("address token too short: {len} characters, expected at least {}", ADDRESS_HEX_LEN)]
    AddressTooShort { len: usize },

    #[error("address token is not valid hex: {0}")]
    InvalidAddressHex(#[from] hex::FromHexError),
}
