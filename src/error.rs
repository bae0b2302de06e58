use thiserror::Error;
use uuid::Uuid;

/// Outcomes that callers must handle. Every variant except `Storage` is a
/// deterministic rejection; `Storage` carries collaborator failures through
/// unchanged.
#[derive(Error, Debug)]
pub enum TripError {
    #[error("trip already active")]
    Conflict,

    #[error("cannot start trip in stop geofence: {name} ({geofence_id})")]
    BlockedByGeofence { geofence_id: Uuid, name: String },

    #[error("no active trip found")]
    NotFound,

    #[error("trip {0} not found")]
    TripNotFound(Uuid),

    #[error("settings not found")]
    SettingsNotFound,

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl TripError {
    /// Stable machine-readable code, sent in error replies.
    pub fn code(&self) -> &'static str {
        match self {
            TripError::Conflict => "conflict",
            TripError::BlockedByGeofence { .. } => "blocked_by_geofence",
            TripError::NotFound | TripError::TripNotFound(_) | TripError::SettingsNotFound => {
                "not_found"
            }
            TripError::Storage(_) => "internal",
        }
    }
}
