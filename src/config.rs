use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Service configuration, read from the environment (and `.env` if present).
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub kafka_bootstrap_servers: String,
    pub kafka_topic: String,
    pub kafka_reply_topic: String,
    pub kafka_group_id: String,
    pub kafka_auto_offset_reset: String,
    pub kafka_sasl_mechanism: String,
    pub kafka_username: String,
    pub kafka_password: String,
    pub kafka_security_protocol: String,
    pub kafka_max_retries: u32,
    pub kafka_circuit_breaker_cooldown: u64,
    pub dispatch_shards: usize,
    pub dispatch_queue_capacity: usize,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing keys and numbers that
    /// fail to parse fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let num = |key: &str, default: u64| parse_or(lookup(key), default);

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            var("DB_USER", "trips"),
            var("DB_PWD", ""),
            var("DB_HOST", "localhost"),
            var("DB_PORT", "5432"),
            var("DB_DATABASE", "trip_tracker"),
        );

        Ok(Self {
            kafka_bootstrap_servers: var("KAFKA_BOOTSTRAP_SERVERS", "localhost:9092"),
            kafka_topic: var("KAFKA_TOPIC", "trip-commands"),
            kafka_reply_topic: var("KAFKA_REPLY_TOPIC", "trip-replies"),
            kafka_group_id: var("KAFKA_GROUP_ID", "trip-tracker"),
            kafka_auto_offset_reset: var("KAFKA_AUTO_OFFSET_RESET", "latest"),
            kafka_sasl_mechanism: var("KAFKA_SASL_MECHANISM", "SCRAM-SHA-256"),
            kafka_username: var("KAFKA_USERNAME", ""),
            kafka_password: var("KAFKA_PASSWORD", ""),
            kafka_security_protocol: var("KAFKA_SECURITY_PROTOCOL", "SASL_PLAINTEXT"),
            kafka_max_retries: num("KAFKA_MAX_RETRIES", 5) as u32,
            kafka_circuit_breaker_cooldown: num("KAFKA_CIRCUIT_BREAKER_COOLDOWN", 300),
            dispatch_shards: num("DISPATCH_SHARDS", 16).max(1) as usize,
            dispatch_queue_capacity: num("DISPATCH_QUEUE_CAPACITY", 1024).max(1) as usize,
            database_url,
            db_max_connections: num("DB_MAX_CONNECTIONS", 20) as u32,
            log_level: var("LOG_LEVEL", "info"),
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
