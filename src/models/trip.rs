use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::geo::{distance_km, Coordinate};
use crate::models::trip_points::TripPoint;

/// Lifecycle position of a user's trip tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripState {
    NoActiveTrip,
    Active,
    Ended,
}

impl TripState {
    /// State of a user given the result of an active-trip lookup.
    pub fn of_user(active: Option<&Trip>) -> Self {
        active.map(Trip::state).unwrap_or(TripState::NoActiveTrip)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
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

impl Trip {
    pub fn begin(
        user_id: Uuid,
        start: Coordinate,
        title: Option<String>,
        description: Option<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            trip_id: Uuid::new_v4(),
            user_id,
            title,
            description,
            start_time: now,
            start_lat: start.latitude,
            start_lng: start.longitude,
            end_time: None,
            end_lat: None,
            end_lng: None,
            total_distance_km: 0.0,
            is_active: true,
            created_at: now,
        }
    }

    pub fn state(&self) -> TripState {
        if self.is_active {
            TripState::Active
        } else {
            TripState::Ended
        }
    }

    /// Adds the leg from `previous` to `next` and returns its length in km.
    /// Without a previous point nothing is added.
    pub fn accumulate(&mut self, previous: Option<Coordinate>, next: Coordinate) -> f64 {
        let leg = previous.map(|p| distance_km(p, next)).unwrap_or(0.0);
        self.total_distance_km += leg;
        leg
    }

    pub fn finish(&mut self, end: Coordinate, now: NaiveDateTime) {
        self.end_time = Some(now);
        self.end_lat = Some(end.latitude);
        self.end_lng = Some(end.longitude);
        self.is_active = false;
    }
}

/// A trip with its recorded points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: Trip,
    pub trip_points: Vec<TripPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 29)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_begin_sets_start_fields() {
        let user = Uuid::new_v4();
        let trip = Trip::begin(user, Coordinate::new(1.5, -2.5), Some("Commute".into()), None, at(8, 0));

        assert_eq!(trip.user_id, user);
        assert_eq!((trip.start_lat, trip.start_lng), (1.5, -2.5));
        assert_eq!(trip.start_time, at(8, 0));
        assert_eq!(trip.total_distance_km, 0.0);
        assert_eq!(trip.state(), TripState::Active);
        assert!(trip.end_time.is_none() && trip.end_lat.is_none());
    }

    #[test]
    fn test_accumulate_without_previous_adds_nothing() {
        let mut trip = Trip::begin(Uuid::new_v4(), Coordinate::new(0.0, 0.0), None, None, at(8, 0));
        let leg = trip.accumulate(None, Coordinate::new(0.0, 1.0));
        assert_eq!(leg, 0.0);
        assert_eq!(trip.total_distance_km, 0.0);
    }

    #[test]
    fn test_accumulate_sums_legs() {
        let mut trip = Trip::begin(Uuid::new_v4(), Coordinate::new(0.0, 0.0), None, None, at(8, 0));
        let a = trip.accumulate(Some(Coordinate::new(0.0, 0.0)), Coordinate::new(0.0, 0.01));
        let b = trip.accumulate(Some(Coordinate::new(0.0, 0.01)), Coordinate::new(0.0, 0.02));
        assert!((trip.total_distance_km - (a + b)).abs() < 1e-12);
        assert!((trip.total_distance_km - 2.224).abs() < 0.01);
    }

    #[test]
    fn test_finish_ends_trip() {
        let mut trip = Trip::begin(Uuid::new_v4(), Coordinate::new(0.0, 0.0), None, None, at(8, 0));
        trip.finish(Coordinate::new(3.0, 4.0), at(9, 30));

        assert_eq!(trip.state(), TripState::Ended);
        assert_eq!((trip.end_lat, trip.end_lng), (Some(3.0), Some(4.0)));
        assert_eq!(trip.end_time, Some(at(9, 30)));
    }

    #[test]
    fn test_state_of_user() {
        let trip = Trip::begin(Uuid::new_v4(), Coordinate::new(0.0, 0.0), None, None, at(8, 0));
        assert_eq!(TripState::of_user(None), TripState::NoActiveTrip);
        assert_eq!(TripState::of_user(Some(&trip)), TripState::Active);
    }

    #[test]
    fn test_detail_serializes_flat() {
        let trip = Trip::begin(Uuid::nil(), Coordinate::new(1.0, 2.0), None, None, at(8, 0));
        let json = serde_json::to_value(TripDetail {
            trip,
            trip_points: Vec::new(),
        })
        .unwrap();
        assert_eq!(json["start_lat"], 1.0);
        assert_eq!(json["is_active"], true);
        assert!(json["trip_points"].as_array().unwrap().is_empty());
    }
}
