//! The live-location stream envelope and the events decoded from it.
//!
//! The server pushes one JSON object per WebSocket text frame:
//!
//! ```json
//! { "type": "gps_update", "farm_id": "...", "animal_id": "...", "payload": { ... } }
//! ```
//!
//! [`decode_envelope`] parses the outer object; [`Envelope::into_event`]
//! interprets the payload according to `type` and yields a
//! [`StreamEvent`] tagged by [`EventKind`]. Anything that does not fit
//! (unknown `type`, missing fields, wrong payload shape) is a
//! [`DecodeError`]; callers drop such messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::AnimalId;

/// Errors raised while decoding a stream message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The frame is not a valid envelope (bad JSON or unknown `type`).
    #[error("invalid envelope: {source}")]
    Envelope {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The envelope's payload does not match its declared type.
    #[error("invalid {event_type:?} payload: {source}")]
    Payload {
        /// The declared envelope type.
        event_type: EnvelopeType,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Wire-level message type carried in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeType {
    /// A GPS fix from an animal's collar or ear tag.
    GpsUpdate,
    /// A farm alert (animal out of zone, device offline...).
    Alert,
    /// A device heartbeat with battery and online state.
    DeviceStatus,
}

/// The outer JSON object of every stream message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Message type.
    #[serde(rename = "type")]
    pub event_type: EnvelopeType,
    /// Farm the message belongs to.
    pub farm_id: String,
    /// Animal the message concerns, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<String>,
    /// Type-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Payload of a `gps_update` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsPayload {
    /// Animal that reported the fix.
    pub animal_id: AnimalId,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Ground speed in km/h.
    #[serde(default)]
    pub speed_kmh: Option<f64>,
    /// Device battery percentage.
    #[serde(default, deserialize_with = "lenient_percent")]
    pub battery: Option<u8>,
    /// Time of the fix (RFC 3339).
    pub timestamp: DateTime<Utc>,
}

/// Payload of an `alert` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Alert category, e.g. `out_of_zone`.
    #[serde(rename = "type")]
    pub alert_type: String,
    /// Human-readable message.
    pub message: String,
}

/// Payload of a `device_status` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatusPayload {
    /// Device identifier.
    pub device_id: String,
    /// Battery percentage.
    #[serde(default, deserialize_with = "lenient_percent")]
    pub battery_pct: Option<u8>,
    /// Whether the device is reachable.
    pub online: bool,
}

/// Read an integer percentage, dropping values outside `0..=255` instead of
/// failing the whole payload.
fn lenient_percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u8>, D::Error> {
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| u8::try_from(value).ok()))
}

/// Discriminator of a decoded [`StreamEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// An animal moved.
    PositionUpdate,
    /// A farm alert was raised.
    Alert,
    /// A device reported its status.
    Status,
}

/// A new position for one tracked entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEvent {
    /// The animal that moved.
    pub entity_id: AnimalId,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Time of the fix.
    pub timestamp: DateTime<Utc>,
    /// Ground speed in km/h, if reported.
    pub speed_kmh: Option<f64>,
    /// Device battery percentage, if reported.
    pub battery: Option<u8>,
}

impl From<GpsPayload> for PositionEvent {
    fn from(p: GpsPayload) -> Self {
        Self {
            entity_id: p.animal_id,
            latitude: p.lat,
            longitude: p.lng,
            timestamp: p.timestamp,
            speed_kmh: p.speed_kmh,
            battery: p.battery,
        }
    }
}

/// A farm alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Farm the alert belongs to.
    pub farm_id: String,
    /// Animal concerned, if any.
    pub animal_id: Option<String>,
    /// Alert category.
    pub alert_type: String,
    /// Human-readable message.
    pub message: String,
}

/// A device heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatusEvent {
    /// Device identifier.
    pub device_id: String,
    /// Battery percentage, if reported.
    pub battery_pct: Option<u8>,
    /// Whether the device is reachable.
    pub online: bool,
}

/// A decoded stream message, tagged by [`EventKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamEvent {
    /// An animal moved.
    PositionUpdate(PositionEvent),
    /// A farm alert was raised.
    Alert(AlertEvent),
    /// A device reported its status.
    Status(DeviceStatusEvent),
}

impl StreamEvent {
    /// Return this event's discriminator.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PositionUpdate(_) => EventKind::PositionUpdate,
            Self::Alert(_) => EventKind::Alert,
            Self::Status(_) => EventKind::Status,
        }
    }
}

impl Envelope {
    /// Interpret the payload according to the envelope type.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Payload`] if the payload does not match the
    /// shape its type requires.
    pub fn into_event(self) -> Result<StreamEvent, DecodeError> {
        let event_type = self.event_type;
        let payload_err = |source| DecodeError::Payload { event_type, source };
        match event_type {
            EnvelopeType::GpsUpdate => {
                let gps: GpsPayload =
                    serde_json::from_value(self.payload).map_err(payload_err)?;
                Ok(StreamEvent::PositionUpdate(gps.into()))
            }
            EnvelopeType::Alert => {
                let alert: AlertPayload =
                    serde_json::from_value(self.payload).map_err(payload_err)?;
                Ok(StreamEvent::Alert(AlertEvent {
                    farm_id: self.farm_id,
                    animal_id: self.animal_id,
                    alert_type: alert.alert_type,
                    message: alert.message,
                }))
            }
            EnvelopeType::DeviceStatus => {
                let status: DeviceStatusPayload =
                    serde_json::from_value(self.payload).map_err(payload_err)?;
                Ok(StreamEvent::Status(DeviceStatusEvent {
                    device_id: status.device_id,
                    battery_pct: status.battery_pct,
                    online: status.online,
                }))
            }
        }
    }
}

/// Parse the outer envelope of a stream text frame.
///
/// # Errors
///
/// Returns [`DecodeError::Envelope`] for invalid JSON or an unknown `type`.
pub fn decode_envelope(text: &str) -> Result<Envelope, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a stream text frame all the way to a typed [`StreamEvent`].
///
/// # Errors
///
/// Returns a [`DecodeError`] if either the envelope or its payload is
/// malformed.
pub fn decode_event(text: &str) -> Result<StreamEvent, DecodeError> {
    decode_envelope(text)?.into_event()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    const ANIMAL: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    fn gps_frame() -> String {
        format!(
            r#"{{"type":"gps_update","farm_id":"f1","animal_id":"{ANIMAL}",
                "payload":{{"animal_id":"{ANIMAL}","lat":-20.21,"lng":-55.01,
                "speed_kmh":3.5,"battery":87,"timestamp":"2026-03-01T12:00:00Z"}}}}"#
        )
    }

    #[test]
    fn gps_update_decodes_to_position_event() {
        let event = decode_event(&gps_frame()).unwrap();
        assert_eq!(event.kind(), EventKind::PositionUpdate);
        let StreamEvent::PositionUpdate(position) = event else {
            panic!("expected position update");
        };
        assert_eq!(position.entity_id.to_string(), ANIMAL);
        assert_eq!(position.longitude, -55.01);
        assert_eq!(position.latitude, -20.21);
        assert_eq!(position.battery, Some(87));
    }

    #[test]
    fn out_of_range_battery_keeps_the_position() {
        for battery in ["-1", "300"] {
            let frame = gps_frame().replace("\"battery\":87", &format!("\"battery\":{battery}"));
            let StreamEvent::PositionUpdate(position) = decode_event(&frame).unwrap() else {
                panic!("expected position update");
            };
            assert_eq!(position.battery, None);
            assert_eq!(position.longitude, -55.01);
        }
    }

    #[test]
    fn missing_or_null_battery_reads_as_none() {
        let frame = format!(
            r#"{{"type":"gps_update","farm_id":"f1","payload":{{"animal_id":"{ANIMAL}",
                "lat":1.0,"lng":2.0,"battery":null,"timestamp":"2026-03-01T12:00:00Z"}}}}"#
        );
        let StreamEvent::PositionUpdate(position) = decode_event(&frame).unwrap() else {
            panic!("expected position update");
        };
        assert_eq!(position.battery, None);
        assert_eq!(position.speed_kmh, None);
    }

    #[test]
    fn alert_keeps_envelope_context() {
        let frame = r#"{"type":"alert","farm_id":"f1","payload":{"type":"out_of_zone","message":"BR-0042 left North paddock"}}"#;
        let event = decode_event(frame).unwrap();
        let StreamEvent::Alert(alert) = event else {
            panic!("expected alert");
        };
        assert_eq!(alert.farm_id, "f1");
        assert_eq!(alert.alert_type, "out_of_zone");
        assert!(alert.animal_id.is_none());
    }

    #[test]
    fn device_status_decodes() {
        let frame = r#"{"type":"device_status","farm_id":"f1","payload":{"device_id":"d-9","battery_pct":12,"online":false}}"#;
        let event = decode_event(frame).unwrap();
        assert_eq!(event.kind(), EventKind::Status);
    }

    #[test]
    fn device_status_with_unknown_battery_decodes() {
        let frame = r#"{"type":"device_status","farm_id":"f1","payload":{"device_id":"d-9","battery_pct":-1,"online":true}}"#;
        let StreamEvent::Status(status) = decode_event(frame).unwrap() else {
            panic!("expected device status");
        };
        assert_eq!(status.battery_pct, None);
        assert!(status.online);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let frame = r#"{"type":"weather","farm_id":"f1","payload":{}}"#;
        assert!(matches!(
            decode_event(frame),
            Err(DecodeError::Envelope { .. })
        ));
    }

    #[test]
    fn malformed_payload_is_rejected() {
        let frame = r#"{"type":"gps_update","farm_id":"f1","payload":{"lat":"north"}}"#;
        assert!(matches!(
            decode_event(frame),
            Err(DecodeError::Payload {
                event_type: EnvelopeType::GpsUpdate,
                ..
            })
        ));
    }

    #[test]
    fn not_json_is_rejected() {
        assert!(decode_event("ping").is_err());
    }

    #[test]
    fn stream_event_serializes_with_kind_tag() {
        let event = decode_event(&gps_frame()).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "position_update");
    }
}
