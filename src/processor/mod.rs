pub mod dispatcher;
pub mod geofence;
pub mod message_processor;
pub mod reply;
pub mod trip_machine;
pub mod trip_queries;
