pub mod geofence;
pub mod message;
pub mod reply;
pub mod settings;
pub mod trip;
pub mod trip_event;
pub mod trip_points;
