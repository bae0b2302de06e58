use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEventKind {
    Started,
    Stopped,
    AutoStopped,
}

impl TripEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripEventKind::Started => "started",
            TripEventKind::Stopped => "stopped",
            TripEventKind::AutoStopped => "auto_stopped",
        }
    }
}

/// Audit record of a lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TripEvent {
    pub event_id: Uuid,
    pub trip_id: Uuid,
    pub user_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    pub kind: TripEventKind,
    pub geofence_id: Option<Uuid>, // set for auto_stopped
}

impl TripEvent {
    pub fn new(
        trip_id: Uuid,
        user_id: Uuid,
        kind: TripEventKind,
        at: Coordinate,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            trip_id,
            user_id,
            timestamp,
            lat: at.latitude,
            lng: at.longitude,
            kind,
            geofence_id: None,
        }
    }

    pub fn with_geofence(mut self, geofence_id: Uuid) -> Self {
        self.geofence_id = Some(geofence_id);
        self
    }
}
