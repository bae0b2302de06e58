use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceAction {
    #[default]
    Stop,
    Start,
    Notify,
}

impl GeofenceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeofenceAction::Stop => "stop",
            GeofenceAction::Start => "start",
            GeofenceAction::Notify => "notify",
        }
    }
}

impl fmt::Display for GeofenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeofenceAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(GeofenceAction::Stop),
            "start" => Ok(GeofenceAction::Start),
            "notify" => Ok(GeofenceAction::Notify),
            other => Err(anyhow::anyhow!("unknown geofence action '{}'", other)),
        }
    }
}

/// Circular region owned by a user. Radius is in meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geofence {
    pub geofence_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
    pub action: GeofenceAction,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Geofence {
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGeofence {
    pub name: String,
    pub description: Option<String>,
    pub center: Coordinate,
    pub radius_meters: f64,
    pub action: GeofenceAction,
}

impl NewGeofence {
    pub fn into_geofence(self, user_id: Uuid, now: NaiveDateTime) -> Geofence {
        Geofence {
            geofence_id: Uuid::new_v4(),
            user_id,
            name: self.name,
            description: self.description,
            lat: self.center.latitude,
            lng: self.center.longitude,
            radius_meters: self.radius_meters,
            action: self.action,
            is_active: true,
            created_at: now,
        }
    }
}
