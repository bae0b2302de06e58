use crate::geo::{distance_km, Coordinate};
use crate::models::geofence::{Geofence, GeofenceAction};

/// Geofences whose circle contains `point`, in input order. Inactive
/// geofences never trigger. The boundary counts as inside.
pub fn triggered<'a, I>(point: Coordinate, geofences: I) -> Vec<&'a Geofence>
where
    I: IntoIterator<Item = &'a Geofence>,
{
    geofences
        .into_iter()
        .filter(|g| g.is_active && contains(g, point))
        .collect()
}

pub fn contains(geofence: &Geofence, point: Coordinate) -> bool {
    distance_km(point, geofence.center()) * 1000.0 <= geofence.radius_meters
}

/// First triggered geofence carrying `action`.
pub fn first_with_action<'a>(
    triggered: &[&'a Geofence],
    action: GeofenceAction,
) -> Option<&'a Geofence> {
    triggered.iter().copied().find(|g| g.action == action)
}
