use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMethod {
    #[default]
    Cloud,
    Lan,
    Manual,
}

impl SyncMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMethod::Cloud => "cloud",
            SyncMethod::Lan => "lan",
            SyncMethod::Manual => "manual",
        }
    }
}

impl FromStr for SyncMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloud" => Ok(SyncMethod::Cloud),
            "lan" => Ok(SyncMethod::Lan),
            "manual" => Ok(SyncMethod::Manual),
            other => Err(anyhow::anyhow!("unknown sync method '{}'", other)),
        }
    }
}

/// Per-user preferences. Only `auto_stop_at_geofences` is acted on by the
/// trip state machine; the rest is client policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub auto_start_trips: bool,
    pub auto_stop_at_geofences: bool,
    pub location_update_interval: i32, // seconds
    pub distance_threshold: f64,       // km
    pub enable_notifications: bool,
    pub sync_method: SyncMethod,
}

impl UserSettings {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            auto_start_trips: false,
            auto_stop_at_geofences: true,
            location_update_interval: 30,
            distance_threshold: 0.01,
            enable_notifications: true,
            sync_method: SyncMethod::Cloud,
        }
    }
}
