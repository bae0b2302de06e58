use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use crate::db::queries;
use crate::db::rows::{GeofenceRow, TripPointRow, TripRow, UserSettingsRow};
use crate::db::DbPool;
use crate::models::geofence::Geofence;
use crate::models::settings::UserSettings;
use crate::models::trip::Trip;
use crate::models::trip_event::TripEvent;
use crate::models::trip_points::{NewTripPoint, TripPoint};
use crate::repository::{TripRepository, TripTransaction};

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A Postgres transaction holding the per-user advisory lock.
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TripRepository for PgRepository {
    type Tx = PgTx;

    async fn begin(&self, user_id: Uuid) -> Result<PgTx> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(queries::LOCK_USER)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        Ok(PgTx { tx })
    }
}

#[async_trait]
impl TripTransaction for PgTx {
    async fn find_active_trip(&mut self, user_id: Uuid) -> Result<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(queries::SELECT_ACTIVE_TRIP)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Trip::from))
    }

    async fn last_point(&mut self, trip_id: Uuid) -> Result<Option<TripPoint>> {
        let row = sqlx::query_as::<_, TripPointRow>(queries::SELECT_LAST_POINT)
            .bind(trip_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(TripPoint::from))
    }

    async fn list_trips(&mut self, user_id: Uuid, skip: u32, limit: u32) -> Result<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(queries::SELECT_TRIPS)
            .bind(user_id)
            .bind(i64::from(skip))
            .bind(i64::from(limit))
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn get_trip(&mut self, trip_id: Uuid, user_id: Uuid) -> Result<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(queries::SELECT_TRIP)
            .bind(trip_id)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row.map(Trip::from))
    }

    async fn list_points(&mut self, trip_id: Uuid) -> Result<Vec<TripPoint>> {
        let rows = sqlx::query_as::<_, TripPointRow>(queries::SELECT_TRIP_POINTS)
            .bind(trip_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(TripPoint::from).collect())
    }

    async fn create_trip(&mut self, trip: &Trip) -> Result<()> {
        sqlx::query(queries::INSERT_TRIP)
            .bind(trip.trip_id)
            .bind(trip.user_id)
            .bind(&trip.title)
            .bind(&trip.description)
            .bind(trip.start_time)
            .bind(trip.start_lat)
            .bind(trip.start_lng)
            .bind(trip.total_distance_km)
            .bind(trip.is_active)
            .bind(trip.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn append_point(&mut self, point: &NewTripPoint) -> Result<TripPoint> {
        let row = sqlx::query(queries::INSERT_TRIP_POINT)
            .bind(point.trip_id)
            .bind(point.timestamp)
            .bind(point.sample.coordinate.latitude)
            .bind(point.sample.coordinate.longitude)
            .bind(point.sample.altitude)
            .bind(point.sample.speed)
            .bind(point.sample.accuracy)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(TripPoint {
            point_id: row.try_get("point_id")?,
            trip_id: point.trip_id,
            timestamp: point.timestamp,
            lat: point.sample.coordinate.latitude,
            lng: point.sample.coordinate.longitude,
            altitude: point.sample.altitude,
            speed: point.sample.speed,
            accuracy: point.sample.accuracy,
        })
    }

    async fn update_trip(&mut self, trip: &Trip) -> Result<()> {
        sqlx::query(queries::UPDATE_TRIP)
            .bind(trip.trip_id)
            .bind(trip.end_time)
            .bind(trip.end_lat)
            .bind(trip.end_lng)
            .bind(trip.total_distance_km)
            .bind(trip.is_active)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_geofences(&mut self, user_id: Uuid) -> Result<Vec<Geofence>> {
        let rows = sqlx::query_as::<_, GeofenceRow>(queries::SELECT_ACTIVE_GEOFENCES)
            .bind(user_id)
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter().map(Geofence::try_from).collect()
    }

    async fn get_settings(&mut self, user_id: Uuid) -> Result<Option<UserSettings>> {
        let row = sqlx::query_as::<_, UserSettingsRow>(queries::SELECT_SETTINGS)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(UserSettings::try_from).transpose()
    }

    async fn record_event(&mut self, event: &TripEvent) -> Result<()> {
        sqlx::query(queries::INSERT_TRIP_EVENT)
            .bind(event.event_id)
            .bind(event.trip_id)
            .bind(event.user_id)
            .bind(event.timestamp)
            .bind(event.lat)
            .bind(event.lng)
            .bind(event.kind.as_str())
            .bind(event.geofence_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn create_geofence(&mut self, geofence: &Geofence) -> Result<()> {
        sqlx::query(queries::INSERT_GEOFENCE)
            .bind(geofence.geofence_id)
            .bind(geofence.user_id)
            .bind(&geofence.name)
            .bind(&geofence.description)
            .bind(geofence.lat)
            .bind(geofence.lng)
            .bind(geofence.radius_meters)
            .bind(geofence.action.as_str())
            .bind(geofence.is_active)
            .bind(geofence.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn save_settings(&mut self, settings: &UserSettings) -> Result<()> {
        sqlx::query(queries::UPSERT_SETTINGS)
            .bind(settings.user_id)
            .bind(settings.auto_start_trips)
            .bind(settings.auto_stop_at_geofences)
            .bind(settings.location_update_interval)
            .bind(settings.distance_threshold)
            .bind(settings.enable_notifications)
            .bind(settings.sync_method.as_str())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
