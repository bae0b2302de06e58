use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::TripError;
use crate::geo::Coordinate;
use crate::models::geofence::{Geofence, NewGeofence};
use crate::models::message::{Command, CommandMessage, SettingsPayload};
use crate::models::reply::{LocationReply, Reply, ReplyBody, ReplyData};
use crate::models::settings::UserSettings;
use crate::processor::reply::ReplySink;
use crate::processor::trip_machine::TripMachine;
use crate::processor::trip_queries;
use crate::repository::{TripRepository, TripTransaction};

/// Decodes one record from the commands topic. Malformed payloads are
/// logged and yield `None`.
pub fn decode(payload: &[u8]) -> Option<CommandMessage> {
    match serde_json::from_slice(payload) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("Failed to parse message: {}", e);
            None
        }
    }
}

/// Applies a decoded command and publishes its reply.
///
/// Rejected commands are answered with an error reply and consumed. Storage
/// failures are answered too, then returned to the caller.
pub async fn handle_message<R, C, S>(
    machine: &TripMachine<R, C>,
    sink: &S,
    message: CommandMessage,
) -> anyhow::Result<()>
where
    R: TripRepository,
    C: Clock,
    S: ReplySink,
{
    let CommandMessage {
        uuid,
        user_id,
        command,
    } = message;
    let kind = command.kind();
    let correlation_id = uuid.as_deref().unwrap_or("-").to_string();
    debug!(
        "Processing {} for user {} [{}] at {:?}",
        kind,
        user_id,
        correlation_id,
        command.coordinate()
    );

    let (body, failure) = match execute(machine, user_id, command).await {
        Ok(data) => (ReplyBody::Ok { data }, None),
        Err(TripError::Storage(e)) => {
            error!("{} for user {} [{}] failed: {}", kind, user_id, correlation_id, e);
            let body = ReplyBody::Error {
                code: "internal",
                message: "internal error".to_string(),
            };
            (body, Some(e))
        }
        Err(rejection) => {
            warn!("{} for user {} [{}] rejected: {}", kind, user_id, correlation_id, rejection);
            let body = ReplyBody::Error {
                code: rejection.code(),
                message: rejection.to_string(),
            };
            (body, None)
        }
    };

    let reply = Reply {
        uuid,
        user_id,
        command: kind,
        body,
    };
    if let Err(e) = sink.send(&reply).await {
        error!("Failed to publish reply for {} [{}]: {}", kind, correlation_id, e);
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

async fn execute<R, C>(
    machine: &TripMachine<R, C>,
    user_id: Uuid,
    command: Command,
) -> Result<ReplyData, TripError>
where
    R: TripRepository,
    C: Clock,
{
    let repo = machine.repository();
    let data = match command {
        Command::TripStart {
            latitude,
            longitude,
            title,
            description,
        } => {
            let trip = machine
                .start_trip(user_id, Coordinate::new(latitude, longitude), title, description)
                .await?;
            ReplyData::Trip(trip)
        }
        Command::TripUpdate(update) => {
            let outcome = machine.update_trip(user_id, update.into()).await?;
            for fence in &outcome.notified {
                info!(
                    "User {} is inside {} geofence: {}",
                    user_id, fence.action, fence.name
                );
            }
            if outcome.auto_stopped() {
                info!(
                    "Trip automatically stopped at geofence: {}",
                    outcome.geofence_name().unwrap_or_default()
                );
            } else {
                debug!(
                    "Location updated, trip point {} (+{:.4} km)",
                    outcome.trip_point_id(),
                    outcome.leg_km
                );
            }
            ReplyData::Location(LocationReply {
                auto_stopped: outcome.auto_stopped(),
                geofence_name: outcome.geofence_name().map(str::to_string),
                trip_point_id: outcome.trip_point_id(),
                total_distance_km: outcome.trip.total_distance_km,
                inside_geofences: outcome.notified.iter().map(|g| g.name.clone()).collect(),
            })
        }
        Command::TripStop { latitude, longitude } => {
            let trip = machine
                .stop_trip(user_id, Coordinate::new(latitude, longitude))
                .await?;
            ReplyData::Trip(trip)
        }
        Command::GeofenceCreate(payload) => {
            let geofence = create_geofence(machine, user_id, payload.into()).await?;
            info!(
                "Created {} geofence {} ({}) for user {}",
                geofence.action, geofence.name, geofence.geofence_id, user_id
            );
            ReplyData::Geofence(geofence)
        }
        Command::SettingsUpdate(payload) => {
            let settings = update_settings(machine, user_id, payload).await?;
            info!("Updated settings for user {}", user_id);
            ReplyData::Settings(settings)
        }
        Command::TripList { skip, limit } => {
            ReplyData::Trips(trip_queries::trip_history(repo, user_id, skip, limit).await?)
        }
        Command::TripActive => ReplyData::TripDetail(trip_queries::active_trip(repo, user_id).await?),
        Command::TripGet { trip_id } => {
            ReplyData::TripDetail(trip_queries::trip_detail(repo, user_id, trip_id).await?)
        }
        Command::GeofenceList => ReplyData::Geofences(trip_queries::geofences(repo, user_id).await?),
        Command::SettingsGet => ReplyData::Settings(trip_queries::settings(repo, user_id).await?),
    };
    Ok(data)
}

async fn create_geofence<R, C>(
    machine: &TripMachine<R, C>,
    user_id: Uuid,
    new_geofence: NewGeofence,
) -> Result<Geofence, TripError>
where
    R: TripRepository,
    C: Clock,
{
    let geofence = new_geofence.into_geofence(user_id, machine.clock().now());
    let mut tx = machine.repository().begin(user_id).await?;
    tx.create_geofence(&geofence).await?;
    tx.commit().await?;
    Ok(geofence)
}

async fn update_settings<R, C>(
    machine: &TripMachine<R, C>,
    user_id: Uuid,
    payload: SettingsPayload,
) -> Result<UserSettings, TripError>
where
    R: TripRepository,
    C: Clock,
{
    let settings = payload.into_settings(user_id);
    let mut tx = machine.repository().begin(user_id).await?;
    tx.save_settings(&settings).await?;
    tx.commit().await?;
    Ok(settings)
}
