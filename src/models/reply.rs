use serde::Serialize;
use uuid::Uuid;

use crate::models::geofence::Geofence;
use crate::models::settings::UserSettings;
use crate::models::trip::{Trip, TripDetail};

/// Answer to one command, published on the replies topic. `uuid` echoes the
/// command's correlation id.
#[derive(Debug, Serialize)]
pub struct Reply {
    pub uuid: Option<String>,
    pub user_id: Uuid,
    pub command: &'static str,
    #[serde(flatten)]
    pub body: ReplyBody,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplyBody {
    Ok { data: ReplyData },
    Error { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyData {
    Trip(Trip),
    TripDetail(TripDetail),
    Trips(Vec<Trip>),
    Location(LocationReply),
    Geofence(Geofence),
    Geofences(Vec<Geofence>),
    Settings(UserSettings),
}

/// Result of a `trip_update`.
#[derive(Debug, Serialize)]
pub struct LocationReply {
    pub auto_stopped: bool,
    pub geofence_name: Option<String>,
    pub trip_point_id: i64,
    pub total_distance_km: f64,
    /// Names of triggered `start`/`notify` geofences.
    pub inside_geofences: Vec<String>,
}
