use tracing::{debug, info};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::TripError;
use crate::geo::Coordinate;
use crate::models::geofence::{Geofence, GeofenceAction};
use crate::models::trip::{Trip, TripState};
use crate::models::trip_event::{TripEvent, TripEventKind};
use crate::models::trip_points::{LocationSample, NewTripPoint, TripPoint};
use crate::processor::geofence;
use crate::repository::{TripRepository, TripTransaction};

/// Result of a location update on the active trip.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub trip: Trip,
    /// The stored point; for an auto-stop this is the trip's final point.
    pub point: TripPoint,
    /// Distance added by this update, in km. Zero on auto-stop.
    pub leg_km: f64,
    pub auto_stopped_by: Option<Geofence>,
    /// Triggered `start`/`notify` geofences. They never change trip state.
    pub notified: Vec<Geofence>,
}

impl UpdateOutcome {
    pub fn auto_stopped(&self) -> bool {
        self.auto_stopped_by.is_some()
    }

    pub fn geofence_name(&self) -> Option<&str> {
        self.auto_stopped_by.as_ref().map(|g| g.name.as_str())
    }

    pub fn trip_point_id(&self) -> i64 {
        self.point.point_id
    }
}

/// Drives the start/update/stop lifecycle of a user's trip. Every transition
/// runs inside one repository unit of work and commits all of its writes or
/// none of them.
pub struct TripMachine<R, C> {
    repo: R,
    clock: C,
}

impl<R, C> TripMachine<R, C>
where
    R: TripRepository,
    C: Clock,
{
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub async fn start_trip(
        &self,
        user_id: Uuid,
        start: Coordinate,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Trip, TripError> {
        let mut tx = self.repo.begin(user_id).await?;

        let active = tx.find_active_trip(user_id).await?;
        if TripState::of_user(active.as_ref()) == TripState::Active {
            return Err(TripError::Conflict);
        }

        let geofences = tx.list_geofences(user_id).await?;
        let hits = geofence::triggered(start, &geofences);
        if let Some(blocking) = geofence::first_with_action(&hits, GeofenceAction::Stop) {
            return Err(TripError::BlockedByGeofence {
                geofence_id: blocking.geofence_id,
                name: blocking.name.clone(),
            });
        }

        let now = self.clock.now();
        let trip = Trip::begin(user_id, start, title, description, now);
        tx.create_trip(&trip).await?;
        tx.append_point(&NewTripPoint {
            trip_id: trip.trip_id,
            timestamp: now,
            sample: LocationSample::at(start),
        })
        .await?;
        tx.record_event(&TripEvent::new(
            trip.trip_id,
            user_id,
            TripEventKind::Started,
            start,
            now,
        ))
        .await?;
        tx.commit().await?;

        info!("Started new trip {} for user {}", trip.trip_id, user_id);
        Ok(trip)
    }

    pub async fn update_trip(
        &self,
        user_id: Uuid,
        sample: LocationSample,
    ) -> Result<UpdateOutcome, TripError> {
        let mut tx = self.repo.begin(user_id).await?;

        let mut trip = tx
            .find_active_trip(user_id)
            .await?
            .ok_or(TripError::NotFound)?;

        let geofences = tx.list_geofences(user_id).await?;
        let hits = geofence::triggered(sample.coordinate, &geofences);
        let notified: Vec<Geofence> = hits
            .iter()
            .filter(|g| g.action != GeofenceAction::Stop)
            .map(|g| (*g).clone())
            .collect();

        let auto_stop = tx
            .get_settings(user_id)
            .await?
            .map(|s| s.auto_stop_at_geofences)
            .unwrap_or(false);

        if auto_stop {
            if let Some(fence) = geofence::first_with_action(&hits, GeofenceAction::Stop) {
                let fence = fence.clone();
                let point = self
                    .finish(
                        &mut tx,
                        &mut trip,
                        sample.coordinate,
                        TripEventKind::AutoStopped,
                        Some(fence.geofence_id),
                    )
                    .await?;
                tx.commit().await?;

                info!(
                    "Trip {} for user {} automatically stopped at geofence: {}",
                    trip.trip_id, user_id, fence.name
                );
                return Ok(UpdateOutcome {
                    trip,
                    point,
                    leg_km: 0.0,
                    auto_stopped_by: Some(fence),
                    notified,
                });
            }
        }

        // Read before appending so the new point is not its own predecessor.
        let previous = tx.last_point(trip.trip_id).await?;
        let point = tx
            .append_point(&NewTripPoint {
                trip_id: trip.trip_id,
                timestamp: self.clock.now(),
                sample,
            })
            .await?;
        let leg_km = trip.accumulate(previous.map(|p| p.coordinate()), sample.coordinate);
        tx.update_trip(&trip).await?;
        tx.commit().await?;

        debug!(
            "Trip {} +{:.4} km (total {:.4} km)",
            trip.trip_id, leg_km, trip.total_distance_km
        );
        Ok(UpdateOutcome {
            trip,
            point,
            leg_km,
            auto_stopped_by: None,
            notified,
        })
    }

    pub async fn stop_trip(&self, user_id: Uuid, end: Coordinate) -> Result<Trip, TripError> {
        let mut tx = self.repo.begin(user_id).await?;

        let mut trip = tx
            .find_active_trip(user_id)
            .await?
            .ok_or(TripError::NotFound)?;

        self.finish(&mut tx, &mut trip, end, TripEventKind::Stopped, None)
            .await?;
        tx.commit().await?;

        info!(
            "Ended trip {} for user {} ({:.3} km)",
            trip.trip_id, user_id, trip.total_distance_km
        );
        Ok(trip)
    }

    async fn finish(
        &self,
        tx: &mut R::Tx,
        trip: &mut Trip,
        end: Coordinate,
        kind: TripEventKind,
        geofence_id: Option<Uuid>,
    ) -> Result<TripPoint, TripError> {
        let now = self.clock.now();
        trip.finish(end, now);
        tx.update_trip(trip).await?;
        let point = tx
            .append_point(&NewTripPoint {
                trip_id: trip.trip_id,
                timestamp: now,
                sample: LocationSample::at(end),
            })
            .await?;

        let mut event = TripEvent::new(trip.trip_id, trip.user_id, kind, end, now);
        if let Some(id) = geofence_id {
            event = event.with_geofence(id);
        }
        tx.record_event(&event).await?;
        Ok(point)
    }
}
