mod clock;
mod config;
mod db;
mod error;
mod geo;
mod kafka;
mod models;
mod processor;
mod repository;

use std::sync::Arc;

use clock::SystemClock;
use config::AppConfig;
use db::repository::PgRepository;
use kafka::KafkaReplySink;
use processor::dispatcher::Dispatcher;
use processor::trip_machine::TripMachine;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting Trip Tracker Service...");

    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!("Connected to database");
    db::migrate(&pool).await?;

    let machine = Arc::new(TripMachine::new(PgRepository::new(pool), SystemClock));

    let sink = Arc::new(KafkaReplySink::new(&config)?);
    let dispatcher = Dispatcher::spawn(
        machine,
        sink,
        config.dispatch_shards,
        config.dispatch_queue_capacity,
    );

    kafka::start_kafka_consumer(&config, dispatcher).await?;

    info!("Trip Tracker Service stopped");

    Ok(())
}
