use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::geofence::Geofence;
use crate::models::settings::UserSettings;
use crate::models::trip::Trip;
use crate::models::trip_event::TripEvent;
use crate::models::trip_points::{NewTripPoint, TripPoint};

#[cfg(test)]
pub mod memory;

/// Storage for trips and the per-user data the state machine reads.
#[async_trait]
pub trait TripRepository: Send + Sync {
    type Tx: TripTransaction;

    /// Opens a unit of work for `user_id`. Units of work for the same user
    /// are serialized; nothing is visible to others until `commit`.
    async fn begin(&self, user_id: Uuid) -> Result<Self::Tx>;
}

/// One atomic unit of work. Dropping it without `commit` discards every write.
#[async_trait]
pub trait TripTransaction: Send {
    async fn find_active_trip(&mut self, user_id: Uuid) -> Result<Option<Trip>>;

    /// Most recent point of the trip by timestamp, newest insert first on ties.
    async fn last_point(&mut self, trip_id: Uuid) -> Result<Option<TripPoint>>;

    /// Trips of the user, newest first.
    async fn list_trips(&mut self, user_id: Uuid, skip: u32, limit: u32) -> Result<Vec<Trip>>;

    /// A trip, only if it belongs to `user_id`.
    async fn get_trip(&mut self, trip_id: Uuid, user_id: Uuid) -> Result<Option<Trip>>;

    /// All points of the trip in recording order.
    async fn list_points(&mut self, trip_id: Uuid) -> Result<Vec<TripPoint>>;

    async fn create_trip(&mut self, trip: &Trip) -> Result<()>;

    async fn append_point(&mut self, point: &NewTripPoint) -> Result<TripPoint>;

    async fn update_trip(&mut self, trip: &Trip) -> Result<()>;

    /// Active geofences of the user in creation order.
    async fn list_geofences(&mut self, user_id: Uuid) -> Result<Vec<Geofence>>;

    async fn get_settings(&mut self, user_id: Uuid) -> Result<Option<UserSettings>>;

    async fn record_event(&mut self, event: &TripEvent) -> Result<()>;

    async fn create_geofence(&mut self, geofence: &Geofence) -> Result<()>;

    async fn save_settings(&mut self, settings: &UserSettings) -> Result<()>;

    async fn commit(self) -> Result<()>;
}
