use crate::config::AppConfig;
use crate::models::reply::Reply;
use crate::processor::dispatcher::Dispatcher;
use crate::processor::message_processor;
use crate::processor::reply::ReplySink;
use anyhow::anyhow;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use tracing::{error, info, warn};

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn client_config(config: &AppConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.kafka_bootstrap_servers)
        .set("security.protocol", &config.kafka_security_protocol)
        .set("sasl.mechanism", &config.kafka_sasl_mechanism)
        .set("sasl.username", &config.kafka_username)
        .set("sasl.password", &config.kafka_password);
    client_config
}

/// Publishes replies as JSON on the reply topic, keyed by user so a user's
/// replies share a partition.
pub struct KafkaReplySink {
    producer: FutureProducer,
    topic: String,
}

impl KafkaReplySink {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let producer: FutureProducer = client_config(config)
            .set("message.timeout.ms", "5000")
            .create()?;
        info!("Replies go to topic: {}", config.kafka_reply_topic);
        Ok(Self {
            producer,
            topic: config.kafka_reply_topic.clone(),
        })
    }
}

#[async_trait]
impl ReplySink for KafkaReplySink {
    async fn send(&self, reply: &Reply) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(reply)?;
        let key = reply.user_id.to_string();
        self.producer
            .send(
                FutureRecord::to(&self.topic).key(&key).payload(&payload),
                REPLY_TIMEOUT,
            )
            .await
            .map_err(|(e, _)| anyhow!("failed to deliver reply: {}", e))?;
        Ok(())
    }
}

/// Consumes trip commands with SASL authentication and a circuit breaker on
/// repeated receive errors. Decoded commands go to the dispatcher, which
/// applies each user's commands in partition order. On Ctrl-C the loop stops
/// and the dispatcher drains what it already accepted.
pub async fn start_kafka_consumer(config: &AppConfig, dispatcher: Dispatcher) -> anyhow::Result<()> {
    info!("Initializing Kafka consumer for topic: {}", config.kafka_topic);

    let consumer: StreamConsumer = client_config(config)
        .set("group.id", &config.kafka_group_id)
        .set("auto.offset.reset", &config.kafka_auto_offset_reset)
        .create()?;
    consumer.subscribe(&[&config.kafka_topic])?;
    info!("Subscribed to topic: {}", config.kafka_topic);

    let mut consecutive_failures = 0;
    let max_retries = config.kafka_max_retries;
    let cooldown_duration = Duration::from_secs(config.kafka_circuit_breaker_cooldown);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        if consecutive_failures >= max_retries {
            warn!(
                "Circuit breaker tripped ({} consecutive failures)! Sleeping for {} seconds...",
                consecutive_failures, config.kafka_circuit_breaker_cooldown
            );
            tokio::time::sleep(cooldown_duration).await;
            consecutive_failures = 0;
            info!("Circuit breaker reset. Resuming consumption.");
        }

        let received = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping consumer");
                break;
            }
            received = consumer.recv() => received,
        };

        match received {
            Ok(m) => {
                consecutive_failures = 0;

                let Some(payload) = m.payload() else {
                    warn!("Received empty payload from Kafka");
                    continue;
                };
                let Some(message) = message_processor::decode(payload) else {
                    continue;
                };

                dispatcher.submit(message).await?;
            }
            Err(e) => {
                consecutive_failures += 1;
                error!(
                    "Kafka error: {}. Failure count {} / {}",
                    e, consecutive_failures, max_retries
                );
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}
