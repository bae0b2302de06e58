use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::geo::Coordinate;
use crate::models::geofence::{GeofenceAction, NewGeofence};
use crate::models::settings::{SyncMethod, UserSettings};
use crate::models::trip_points::LocationSample;

/// Page size of `trip_list` when the client sends none.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Envelope of every record on the commands topic. `user_id` is already
/// authenticated upstream.
#[derive(Debug, Deserialize)]
pub struct CommandMessage {
    pub uuid: Option<String>,
    pub user_id: Uuid,
    pub command: Command,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    TripStart {
        #[serde(deserialize_with = "parse_f64")]
        latitude: f64,
        #[serde(deserialize_with = "parse_f64")]
        longitude: f64,
        #[serde(default, deserialize_with = "parse_string_option")]
        title: Option<String>,
        #[serde(default, deserialize_with = "parse_string_option")]
        description: Option<String>,
    },
    TripUpdate(UpdatePayload),
    TripStop {
        #[serde(deserialize_with = "parse_f64")]
        latitude: f64,
        #[serde(deserialize_with = "parse_f64")]
        longitude: f64,
    },
    GeofenceCreate(GeofencePayload),
    SettingsUpdate(SettingsPayload),
    TripList {
        #[serde(default)]
        skip: u32,
        #[serde(default = "default_page_size")]
        limit: u32,
    },
    TripActive,
    TripGet {
        trip_id: Uuid,
    },
    GeofenceList,
    SettingsGet,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::TripStart { .. } => "trip_start",
            Command::TripUpdate(_) => "trip_update",
            Command::TripStop { .. } => "trip_stop",
            Command::GeofenceCreate(_) => "geofence_create",
            Command::SettingsUpdate(_) => "settings_update",
            Command::TripList { .. } => "trip_list",
            Command::TripActive => "trip_active",
            Command::TripGet { .. } => "trip_get",
            Command::GeofenceList => "geofence_list",
            Command::SettingsGet => "settings_get",
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Command::TripStart { latitude, longitude, .. }
            | Command::TripStop { latitude, longitude } => {
                Some(Coordinate::new(*latitude, *longitude))
            }
            Command::TripUpdate(p) => Some(Coordinate::new(p.latitude, p.longitude)),
            Command::GeofenceCreate(p) => Some(Coordinate::new(p.latitude, p.longitude)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePayload {
    #[serde(deserialize_with = "parse_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "parse_f64")]
    pub longitude: f64,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub altitude: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "parse_f64_option")]
    pub accuracy: Option<f64>,
}

impl From<UpdatePayload> for LocationSample {
    fn from(p: UpdatePayload) -> Self {
        LocationSample {
            coordinate: Coordinate::new(p.latitude, p.longitude),
            altitude: p.altitude,
            speed: p.speed,
            accuracy: p.accuracy,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeofencePayload {
    pub name: String,
    #[serde(default, deserialize_with = "parse_string_option")]
    pub description: Option<String>,
    #[serde(deserialize_with = "parse_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "parse_f64")]
    pub longitude: f64,
    #[serde(deserialize_with = "parse_f64")]
    pub radius: f64, // meters
    #[serde(default)]
    pub action: GeofenceAction,
}

impl From<GeofencePayload> for NewGeofence {
    fn from(p: GeofencePayload) -> Self {
        NewGeofence {
            name: p.name,
            description: p.description,
            center: Coordinate::new(p.latitude, p.longitude),
            radius_meters: p.radius,
            action: p.action,
        }
    }
}

/// Full replacement of a user's settings; absent fields take their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsPayload {
    pub auto_start_trips: bool,
    pub auto_stop_at_geofences: bool,
    pub location_update_interval: i32,
    pub distance_threshold: f64,
    pub enable_notifications: bool,
    pub sync_method: SyncMethod,
}

impl Default for SettingsPayload {
    fn default() -> Self {
        let d = UserSettings::defaults_for(Uuid::nil());
        Self {
            auto_start_trips: d.auto_start_trips,
            auto_stop_at_geofences: d.auto_stop_at_geofences,
            location_update_interval: d.location_update_interval,
            distance_threshold: d.distance_threshold,
            enable_notifications: d.enable_notifications,
            sync_method: d.sync_method,
        }
    }
}

impl SettingsPayload {
    pub fn into_settings(self, user_id: Uuid) -> UserSettings {
        UserSettings {
            user_id,
            auto_start_trips: self.auto_start_trips,
            auto_stop_at_geofences: self.auto_stop_at_geofences,
            location_update_interval: self.location_update_interval,
            distance_threshold: self.distance_threshold,
            enable_notifications: self.enable_notifications,
            sync_method: self.sync_method,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrFloat {
    String(String),
    Float(f64),
}

fn parse_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match StringOrFloat::deserialize(deserializer)? {
        StringOrFloat::Float(f) => Ok(f),
        StringOrFloat::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

fn parse_f64_option<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<StringOrFloat> = Option::deserialize(deserializer)?;
    match v {
        Some(StringOrFloat::Float(f)) => Ok(Some(f)),
        Some(StringOrFloat::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.trim().parse::<f64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}

fn parse_string_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(deserializer)?;
    Ok(v.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsing_trip_update_with_string_numbers() {
        let payload = r#"
        {
            "uuid": "d52b1454-d43d-50fa-99ca-79515c904162",
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": {
                "type": "trip_update",
                "latitude": "+20.652494",
                "longitude": "-100.391404",
                "speed": "42.5",
                "accuracy": "",
                "altitude": 1820
            }
        }
        "#;

        let msg: CommandMessage = serde_json::from_str(payload).unwrap();
        assert_eq!(msg.command.kind(), "trip_update");
        let Command::TripUpdate(update) = msg.command else {
            panic!("expected trip_update");
        };
        let sample = LocationSample::from(update);
        assert_eq!(sample.coordinate, Coordinate::new(20.652494, -100.391404));
        assert_eq!(sample.speed, Some(42.5));
        assert_eq!(sample.accuracy, None);
        assert_eq!(sample.altitude, Some(1820.0));
    }

    #[test]
    fn test_parsing_trip_start_without_optionals() {
        let payload = r#"{
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": { "type": "trip_start", "latitude": 0.0, "longitude": 0.0, "title": "" }
        }"#;

        let msg: CommandMessage = serde_json::from_str(payload).unwrap();
        assert!(msg.uuid.is_none());
        match msg.command {
            Command::TripStart { title, description, .. } => {
                assert!(title.is_none());
                assert!(description.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parsing_geofence_defaults_to_stop() {
        let payload = r#"{
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": {
                "type": "geofence_create",
                "name": "Home",
                "latitude": 20.5888,
                "longitude": -100.3899,
                "radius": "150"
            }
        }"#;

        let msg: CommandMessage = serde_json::from_str(payload).unwrap();
        assert_eq!(msg.command.coordinate(), Some(Coordinate::new(20.5888, -100.3899)));
        let Command::GeofenceCreate(payload) = msg.command else {
            panic!("expected geofence_create");
        };
        let geofence = NewGeofence::from(payload);
        assert_eq!(geofence.name, "Home");
        assert_eq!(geofence.radius_meters, 150.0);
        assert_eq!(geofence.action, GeofenceAction::Stop);
    }

    #[test]
    fn test_parsing_partial_settings_update() {
        let payload = r#"{
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": { "type": "settings_update", "auto_stop_at_geofences": false, "sync_method": "lan" }
        }"#;

        let msg: CommandMessage = serde_json::from_str(payload).unwrap();
        let Command::SettingsUpdate(payload) = msg.command else {
            panic!("expected settings_update");
        };
        let settings = payload.into_settings(msg.user_id);
        assert!(!settings.auto_stop_at_geofences);
        assert_eq!(settings.sync_method, SyncMethod::Lan);
        assert_eq!(settings.location_update_interval, 30);
    }

    #[test]
    fn test_parsing_queries() {
        let list: CommandMessage = serde_json::from_str(
            r#"{"user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e", "command": {"type": "trip_list", "skip": 20}}"#,
        )
        .unwrap();
        match list.command {
            Command::TripList { skip, limit } => {
                assert_eq!(skip, 20);
                assert_eq!(limit, DEFAULT_PAGE_SIZE);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let active: CommandMessage = serde_json::from_str(
            r#"{"user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e", "command": {"type": "trip_active"}}"#,
        )
        .unwrap();
        assert_eq!(active.command.kind(), "trip_active");
        assert!(active.command.coordinate().is_none());

        let bad_skip = r#"{"user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e", "command": {"type": "trip_list", "skip": -1}}"#;
        assert!(serde_json::from_str::<CommandMessage>(bad_skip).is_err());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let payload = r#"{
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": { "type": "trip_pause" }
        }"#;
        assert!(serde_json::from_str::<CommandMessage>(payload).is_err());
    }

    #[test]
    fn test_non_numeric_latitude_is_rejected() {
        let payload = r#"{
            "user_id": "7f0c1a52-3c55-4d7e-9a3f-0e1f2b3c4d5e",
            "command": { "type": "trip_stop", "latitude": "north", "longitude": 1.0 }
        }"#;
        assert!(serde_json::from_str::<CommandMessage>(payload).is_err());
    }
}
