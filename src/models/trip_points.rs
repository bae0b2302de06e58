use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::geo::Coordinate;

/// One stored location sample of a trip. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPoint {
    pub point_id: i64,
    pub trip_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub lat: f64,
    pub lng: f64,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,    // km/h
    pub accuracy: Option<f64>, // meters
}

impl TripPoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lng)
    }
}

/// A location report as received from the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    pub coordinate: Coordinate,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
    pub accuracy: Option<f64>,
}

impl LocationSample {
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            altitude: None,
            speed: None,
            accuracy: None,
        }
    }
}

/// A point that has not been stored yet; the repository assigns `point_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTripPoint {
    pub trip_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub sample: LocationSample,
}
