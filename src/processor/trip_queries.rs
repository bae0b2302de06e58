//! Read side: trip history, trip detail, geofences and settings of a user.

use uuid::Uuid;

use crate::error::TripError;
use crate::models::geofence::Geofence;
use crate::models::settings::UserSettings;
use crate::models::trip::{Trip, TripDetail};
use crate::repository::{TripRepository, TripTransaction};

pub async fn trip_history<R: TripRepository>(
    repo: &R,
    user_id: Uuid,
    skip: u32,
    limit: u32,
) -> Result<Vec<Trip>, TripError> {
    let mut tx = repo.begin(user_id).await?;
    let trips = tx.list_trips(user_id, skip, limit).await?;
    tx.commit().await?;
    Ok(trips)
}

pub async fn active_trip<R: TripRepository>(repo: &R, user_id: Uuid) -> Result<TripDetail, TripError> {
    let mut tx = repo.begin(user_id).await?;
    let trip = tx
        .find_active_trip(user_id)
        .await?
        .ok_or(TripError::NotFound)?;
    let trip_points = tx.list_points(trip.trip_id).await?;
    tx.commit().await?;
    Ok(TripDetail { trip, trip_points })
}

/// Trip by id. Someone else's trip reads as missing.
pub async fn trip_detail<R: TripRepository>(
    repo: &R,
    user_id: Uuid,
    trip_id: Uuid,
) -> Result<TripDetail, TripError> {
    let mut tx = repo.begin(user_id).await?;
    let trip = tx
        .get_trip(trip_id, user_id)
        .await?
        .ok_or(TripError::TripNotFound(trip_id))?;
    let trip_points = tx.list_points(trip.trip_id).await?;
    tx.commit().await?;
    Ok(TripDetail { trip, trip_points })
}

pub async fn geofences<R: TripRepository>(repo: &R, user_id: Uuid) -> Result<Vec<Geofence>, TripError> {
    let mut tx = repo.begin(user_id).await?;
    let geofences = tx.list_geofences(user_id).await?;
    tx.commit().await?;
    Ok(geofences)
}

pub async fn settings<R: TripRepository>(repo: &R, user_id: Uuid) -> Result<UserSettings, TripError> {
    let mut tx = repo.begin(user_id).await?;
    let settings = tx
        .get_settings(user_id)
        .await?
        .ok_or(TripError::SettingsNotFound)?;
    tx.commit().await?;
    Ok(settings)
}
