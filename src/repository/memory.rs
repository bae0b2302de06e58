use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{TripRepository, TripTransaction};
use crate::models::geofence::Geofence;
use crate::models::settings::UserSettings;
use crate::models::trip::Trip;
use crate::models::trip_event::TripEvent;
use crate::models::trip_points::{NewTripPoint, TripPoint};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub trips: Vec<Trip>,
    pub points: Vec<TripPoint>,
    pub geofences: Vec<Geofence>,
    pub settings: HashMap<Uuid, UserSettings>,
    pub events: Vec<TripEvent>,
    /// Makes `append_point` fail, to exercise rollback.
    pub fail_point_writes: bool,
    next_point_id: i64,
}

impl MemoryState {
    pub fn points_of(&self, trip_id: Uuid) -> Vec<&TripPoint> {
        self.points.iter().filter(|p| p.trip_id == trip_id).collect()
    }

    pub fn active_trips_of(&self, user_id: Uuid) -> usize {
        self.trips
            .iter()
            .filter(|t| t.user_id == user_id && t.is_active)
            .count()
    }
}

/// In-process repository. One lock guards the whole state, so every unit of
/// work is serialized; writes go to a staged copy that replaces the state on
/// commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.state.lock().await.clone()
    }

    pub async fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut MemoryState),
    {
        let mut state = self.state.lock().await;
        f(&mut state);
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl TripRepository for MemoryRepository {
    type Tx = MemoryTx;

    async fn begin(&self, _user_id: Uuid) -> Result<MemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryTx { guard, staged })
    }
}

#[async_trait]
impl TripTransaction for MemoryTx {
    async fn find_active_trip(&mut self, user_id: Uuid) -> Result<Option<Trip>> {
        Ok(self
            .staged
            .trips
            .iter()
            .find(|t| t.user_id == user_id && t.is_active)
            .cloned())
    }

    async fn last_point(&mut self, trip_id: Uuid) -> Result<Option<TripPoint>> {
        Ok(self
            .staged
            .points
            .iter()
            .filter(|p| p.trip_id == trip_id)
            .max_by_key(|p| (p.timestamp, p.point_id))
            .cloned())
    }

    async fn list_trips(&mut self, user_id: Uuid, skip: u32, limit: u32) -> Result<Vec<Trip>> {
        let mut trips: Vec<Trip> = self
            .staged
            .trips
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // newest first; equal start times keep the latest insert first
        trips.reverse();
        trips.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(trips
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn get_trip(&mut self, trip_id: Uuid, user_id: Uuid) -> Result<Option<Trip>> {
        Ok(self
            .staged
            .trips
            .iter()
            .find(|t| t.trip_id == trip_id && t.user_id == user_id)
            .cloned())
    }

    async fn list_points(&mut self, trip_id: Uuid) -> Result<Vec<TripPoint>> {
        let mut points: Vec<TripPoint> = self
            .staged
            .points
            .iter()
            .filter(|p| p.trip_id == trip_id)
            .cloned()
            .collect();
        points.sort_by_key(|p| (p.timestamp, p.point_id));
        Ok(points)
    }

    async fn create_trip(&mut self, trip: &Trip) -> Result<()> {
        if trip.is_active && self.staged.active_trips_of(trip.user_id) > 0 {
            return Err(anyhow!("unique violation: active trip exists for {}", trip.user_id));
        }
        self.staged.trips.push(trip.clone());
        Ok(())
    }

    async fn append_point(&mut self, point: &NewTripPoint) -> Result<TripPoint> {
        if self.staged.fail_point_writes {
            return Err(anyhow!("trip_points unavailable"));
        }
        self.staged.next_point_id += 1;
        let stored = TripPoint {
            point_id: self.staged.next_point_id,
            trip_id: point.trip_id,
            timestamp: point.timestamp,
            lat: point.sample.coordinate.latitude,
            lng: point.sample.coordinate.longitude,
            altitude: point.sample.altitude,
            speed: point.sample.speed,
            accuracy: point.sample.accuracy,
        };
        self.staged.points.push(stored.clone());
        Ok(stored)
    }

    async fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        let slot = self
            .staged
            .trips
            .iter_mut()
            .find(|t| t.trip_id == trip.trip_id)
            .ok_or_else(|| anyhow!("trip {} does not exist", trip.trip_id))?;
        *slot = trip.clone();
        Ok(())
    }

    async fn list_geofences(&mut self, user_id: Uuid) -> Result<Vec<Geofence>> {
        Ok(self
            .staged
            .geofences
            .iter()
            .filter(|g| g.user_id == user_id && g.is_active)
            .cloned()
            .collect())
    }

    async fn get_settings(&mut self, user_id: Uuid) -> Result<Option<UserSettings>> {
        Ok(self.staged.settings.get(&user_id).cloned())
    }

    async fn record_event(&mut self, event: &TripEvent) -> Result<()> {
        self.staged.events.push(event.clone());
        Ok(())
    }

    async fn create_geofence(&mut self, geofence: &Geofence) -> Result<()> {
        self.staged.geofences.push(geofence.clone());
        Ok(())
    }

    async fn save_settings(&mut self, settings: &UserSettings) -> Result<()> {
        self.staged
            .settings
            .insert(settings.user_id, settings.clone());
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.staged;
        Ok(())
    }
}
