//! Row types for the Postgres tables and their conversion to domain values.

use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::geofence::{Geofence, GeofenceAction};
use crate::models::settings::{SyncMethod, UserSettings};
use crate::models::trip::Trip;
use crate::models::trip_points::TripPoint;

#[derive(Debug, FromRow)]
pub struct TripRow {
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_time: Option<NaiveDateTime>,
    pub end_lat: Option<f64>,
    pub end_lng: Option<f64>,
    pub total_distance_km: f64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<TripRow> for Trip {
    fn from(r: TripRow) -> Self {
        Trip {
            trip_id: r.trip_id,
            user_id: r.user_id,
            title: r.title,
            description: r.description,
            start_time: r.start_time,
            start_lat: r.start_lat,
            start_lng: r.start_lng,
            end_time: r.end_time,
            end_lat: r.end_lat,
            end_lng: r.end_lng,
            total_distance_km: r.total_distance_km,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct TripPointRow {
    pub point_id: i64, // bigserial
    pub trip_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
}

impl From<TripPointRow> for TripPoint {
    fn from(r: TripPointRow) -> Self {
        TripPoint {
            point_id: r.point_id,
            trip_id: r.trip_id,
            timestamp: r.timestamp,
            lat: r.lat,
            lng: r.lng,
            altitude: r.altitude,
            speed: r.speed,
            accuracy: r.accuracy,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct GeofenceRow {
    pub geofence_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
    pub action: String, // varchar in DB
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<GeofenceRow> for Geofence {
    type Error = anyhow::Error;

    fn try_from(r: GeofenceRow) -> Result<Self, Self::Error> {
        Ok(Geofence {
            geofence_id: r.geofence_id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            lat: r.lat,
            lng: r.lng,
            radius_meters: r.radius_meters,
            action: r.action.parse::<GeofenceAction>()?,
            is_active: r.is_active,
            created_at: r.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UserSettingsRow {
    pub user_id: Uuid,
    pub auto_start_trips: bool,
    pub auto_stop_at_geofences: bool,
    pub location_update_interval: i32,
    pub distance_threshold: f64,
    pub enable_notifications: bool,
    pub sync_method: String,
}

impl TryFrom<UserSettingsRow> for UserSettings {
    type Error = anyhow::Error;

    fn try_from(r: UserSettingsRow) -> Result<Self, Self::Error> {
        Ok(UserSettings {
            user_id: r.user_id,
            auto_start_trips: r.auto_start_trips,
            auto_stop_at_geofences: r.auto_stop_at_geofences,
            location_update_interval: r.location_update_interval,
            distance_threshold: r.distance_threshold,
            enable_notifications: r.enable_notifications,
            sync_method: r.sync_method.parse::<SyncMethod>()?,
        })
    }
}
