//! Snapshot entities returned by the farm API.
//!
//! Only the fields the live map reads are modelled. The API returns more
//! (timestamps, joined names, grazing limits); unknown fields are ignored
//! on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{Point, Polygon};
use crate::ids::{AnimalId, FarmId, HerdId, KeyPointId, UserId, ZoneId};

/// Lifecycle status of an animal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalStatus {
    /// Alive and on the farm.
    #[default]
    Active,
    /// Sold off the farm.
    Sold,
    /// Deceased.
    Dead,
}

/// A tracked animal as listed by `GET /animals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Animal identifier.
    pub id: AnimalId,
    /// Owning farm.
    pub farm_id: FarmId,
    /// Herd the animal belongs to, if any.
    #[serde(default)]
    pub herd_id: Option<HerdId>,
    /// Zone the animal is assigned to, if any.
    #[serde(default)]
    pub zone_id: Option<ZoneId>,
    /// Ear tag, always present.
    pub ear_tag: String,
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: AnimalStatus,
    /// Last GPS fix, if the animal has ever reported one.
    #[serde(default)]
    pub last_location: Option<Point>,
    /// Time of the last GPS fix.
    #[serde(default)]
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Display color of the animal's herd (CSS color string).
    #[serde(default)]
    pub herd_color: Option<String>,
}

impl Animal {
    /// Name shown on the map: the animal's name, or its ear tag.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.ear_tag)
    }
}

/// A grazing zone as listed by `GET /zones`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone identifier.
    pub id: ZoneId,
    /// Owning farm.
    pub farm_id: FarmId,
    /// Display name.
    pub name: String,
    /// Zone outline.
    pub geometry: Polygon,
    /// Area in hectares.
    #[serde(default)]
    pub area_ha: f64,
    /// Whether the zone is in use.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Animals currently inside the zone, as counted by the server.
    #[serde(default)]
    pub animal_count: Option<u32>,
}

/// Kind of landmark a key point marks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPointIcon {
    /// Water source.
    Water,
    /// Barn or shelter.
    Barn,
    /// Gate.
    Gate,
    /// Veterinary station.
    Vet,
    /// Anything else.
    #[default]
    Other,
}

/// A landmark on the farm as listed by `GET /zones/keypoints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// Key point identifier.
    pub id: KeyPointId,
    /// Owning farm.
    pub farm_id: FarmId,
    /// Display name.
    pub name: String,
    /// Landmark kind.
    #[serde(default)]
    pub icon: KeyPointIcon,
    /// Where the landmark is.
    pub location: Point,
    /// Whether the landmark is in use.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A dashboard user, as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Full name.
    pub name: String,
    /// Login email.
    pub email: String,
}

/// A farm the user works in, as stored in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farm {
    /// Farm identifier (the map's context id).
    pub id: FarmId,
    /// Display name.
    pub name: String,
    /// IANA timezone of the farm.
    #[serde(default)]
    pub timezone: Option<String>,
}

const fn default_true() -> bool {
    true
}
