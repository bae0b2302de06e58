pub const CREATE_TRIPS: &str = r#"
CREATE TABLE IF NOT EXISTS trips (
    trip_id uuid PRIMARY KEY,
    user_id uuid NOT NULL,
    title varchar(100) NULL,
    description text NULL,
    start_time timestamp NOT NULL,
    start_lat float8 NOT NULL,
    start_lng float8 NOT NULL,
    end_time timestamp NULL,
    end_lat float8 NULL,
    end_lng float8 NULL,
    total_distance_km float8 NOT NULL DEFAULT 0,
    is_active boolean NOT NULL DEFAULT true,
    created_at timestamp NOT NULL DEFAULT (NOW() AT TIME ZONE 'utc')
);
"#;

pub const CREATE_ONE_ACTIVE_TRIP_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS trips_one_active_per_user ON trips (user_id) WHERE is_active;
"#;

pub const CREATE_TRIP_POINTS: &str = r#"
CREATE TABLE IF NOT EXISTS trip_points (
    point_id bigserial PRIMARY KEY,
    trip_id uuid NOT NULL REFERENCES trips (trip_id) ON DELETE CASCADE,
    timestamp timestamp NOT NULL,
    lat float8 NOT NULL,
    lng float8 NOT NULL,
    altitude float8 NULL,
    speed float8 NULL,
    accuracy float8 NULL
);
"#;

pub const CREATE_TRIP_POINTS_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS trip_points_trip_time ON trip_points (trip_id, timestamp);
"#;

pub const CREATE_GEOFENCES: &str = r#"
CREATE TABLE IF NOT EXISTS geofences (
    geofence_id uuid PRIMARY KEY,
    seq bigserial NOT NULL,
    user_id uuid NOT NULL,
    name varchar(100) NOT NULL,
    description text NULL,
    lat float8 NOT NULL,
    lng float8 NOT NULL,
    radius_meters float8 NOT NULL,
    action varchar(20) NOT NULL DEFAULT 'stop',
    is_active boolean NOT NULL DEFAULT true,
    created_at timestamp NOT NULL
);
"#;

pub const CREATE_USER_SETTINGS: &str = r#"
CREATE TABLE IF NOT EXISTS user_settings (
    user_id uuid PRIMARY KEY,
    auto_start_trips boolean NOT NULL DEFAULT false,
    auto_stop_at_geofences boolean NOT NULL DEFAULT true,
    location_update_interval int4 NOT NULL DEFAULT 30,
    distance_threshold float8 NOT NULL DEFAULT 0.01,
    enable_notifications boolean NOT NULL DEFAULT true,
    sync_method varchar(20) NOT NULL DEFAULT 'cloud'
);
"#;

pub const CREATE_TRIP_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS trip_events (
    event_id uuid PRIMARY KEY,
    trip_id uuid NOT NULL REFERENCES trips (trip_id) ON DELETE CASCADE,
    user_id uuid NOT NULL,
    timestamp timestamp NOT NULL,
    lat float8 NOT NULL,
    lng float8 NOT NULL,
    event_type varchar(20) NOT NULL,
    geofence_id uuid NULL
);
"#;

pub const SCHEMA: &[&str] = &[
    CREATE_TRIPS,
    CREATE_ONE_ACTIVE_TRIP_INDEX,
    CREATE_TRIP_POINTS,
    CREATE_TRIP_POINTS_INDEX,
    CREATE_GEOFENCES,
    CREATE_USER_SETTINGS,
    CREATE_TRIP_EVENTS,
];

/// Serializes units of work per user until the transaction ends.
pub const LOCK_USER: &str = r#"
SELECT pg_advisory_xact_lock(hashtextextended($1::text, 0));
"#;

pub const SELECT_ACTIVE_TRIP: &str = r#"
SELECT trip_id, user_id, title, description, start_time, start_lat, start_lng,
       end_time, end_lat, end_lng, total_distance_km, is_active, created_at
FROM trips WHERE user_id = $1 AND is_active ORDER BY start_time DESC LIMIT 1;
"#;

pub const SELECT_TRIPS: &str = r#"
SELECT trip_id, user_id, title, description, start_time, start_lat, start_lng,
       end_time, end_lat, end_lng, total_distance_km, is_active, created_at
FROM trips WHERE user_id = $1 ORDER BY start_time DESC OFFSET $2 LIMIT $3;
"#;

pub const SELECT_TRIP: &str = r#"
SELECT trip_id, user_id, title, description, start_time, start_lat, start_lng,
       end_time, end_lat, end_lng, total_distance_km, is_active, created_at
FROM trips WHERE trip_id = $1 AND user_id = $2;
"#;

pub const SELECT_TRIP_POINTS: &str = r#"
SELECT point_id, trip_id, timestamp, lat, lng, altitude, speed, accuracy
FROM trip_points WHERE trip_id = $1 ORDER BY timestamp, point_id;
"#;

pub const SELECT_LAST_POINT: &str = r#"
SELECT point_id, trip_id, timestamp, lat, lng, altitude, speed, accuracy
FROM trip_points WHERE trip_id = $1 ORDER BY timestamp DESC, point_id DESC LIMIT 1;
"#;

pub const INSERT_TRIP: &str = r#"
INSERT INTO trips (trip_id, user_id, title, description, start_time, start_lat, start_lng,
                   total_distance_km, is_active, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
"#;

pub const UPDATE_TRIP: &str = r#"
UPDATE trips
SET end_time = $2,
    end_lat = $3,
    end_lng = $4,
    total_distance_km = $5,
    is_active = $6
WHERE trip_id = $1;
"#;

pub const INSERT_TRIP_POINT: &str = r#"
INSERT INTO trip_points (trip_id, timestamp, lat, lng, altitude, speed, accuracy)
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING point_id;
"#;

pub const SELECT_ACTIVE_GEOFENCES: &str = r#"
SELECT geofence_id, user_id, name, description, lat, lng, radius_meters, action, is_active, created_at
FROM geofences WHERE user_id = $1 AND is_active ORDER BY seq;
"#;

pub const INSERT_GEOFENCE: &str = r#"
INSERT INTO geofences (geofence_id, user_id, name, description, lat, lng, radius_meters, action, is_active, created_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10);
"#;

pub const SELECT_SETTINGS: &str = r#"
SELECT user_id, auto_start_trips, auto_stop_at_geofences, location_update_interval,
       distance_threshold, enable_notifications, sync_method
FROM user_settings WHERE user_id = $1;
"#;

pub const UPSERT_SETTINGS: &str = r#"
INSERT INTO user_settings (user_id, auto_start_trips, auto_stop_at_geofences, location_update_interval,
                           distance_threshold, enable_notifications, sync_method)
VALUES ($1, $2, $3, $4, $5, $6, $7)
ON CONFLICT (user_id) DO UPDATE
SET auto_start_trips = $2,
    auto_stop_at_geofences = $3,
    location_update_interval = $4,
    distance_threshold = $5,
    enable_notifications = $6,
    sync_method = $7;
"#;

pub const INSERT_TRIP_EVENT: &str = r#"
INSERT INTO trip_events (event_id, trip_id, user_id, timestamp, lat, lng, event_type, geofence_id)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
"#;
