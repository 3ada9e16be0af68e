use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ProtocolError, EVENT_MOTION_DETECT, PREFIX_LEN, STATUS_START};

/// Alarm notification pushed by a camera
///
/// Every field is best-effort: missing keys default to empty/zero and
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlarmEvent {
    /// Vendor-encoded address token, see [`super::decode_address`]
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Channel")]
    pub channel: i64,
    #[serde(rename = "Descrip")]
    pub description: String,
    #[serde(rename = "Event")]
    pub event_type: String,
    #[serde(rename = "SerialID")]
    pub serial_id: String,
    #[serde(rename = "StartTime")]
    pub start_time: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl AlarmEvent {
    /// True for the only combination that triggers the backend
    pub fn is_motion_start(&self) -> bool {
        self.event_type == EVENT_MOTION_DETECT && self.status == STATUS_START
    }
}

/// Parse one line received from a camera (delimiter already removed).
///
/// The first [`PREFIX_LEN`] bytes are vendor header bytes and are dropped
/// unconditionally; the rest is decoded as a JSON alarm record.
pub fn parse_message(line: &[u8]) -> Result<AlarmEvent, ProtocolError> {
    if line.len() < PREFIX_LEN {
        return Err(ProtocolError::MalformedMessage { len: line.len() });
    }

    let payload = String::from_utf8_lossy(&line[PREFIX_LEN..]);
    let payload = payload.trim();
    debug!("Alarm payload: {}", payload);

    let mut event: AlarmEvent = serde_json::from_str(payload)?;
    // Some firmwares embed raw newlines inside the quoted description
    event.description.retain(|c| c != '\n');

    Ok(event)
}

/// Like [`parse_message`], but an undecodable payload yields an empty
/// event instead of an error. Only a line shorter than the header fails.
pub fn parse_message_lossy(line: &[u8]) -> Result<AlarmEvent, ProtocolError> {
    match parse_message(line) {
        Err(ProtocolError::InvalidPayload(e)) => {
            debug!("Discarding undecodable alarm payload: {}", e);
            Ok(AlarmEvent::default())
        }
        other => other,
    }
}
