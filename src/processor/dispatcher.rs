use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::clock::Clock;
use crate::models::message::CommandMessage;
use crate::processor::message_processor;
use crate::processor::reply::ReplySink;
use crate::processor::trip_machine::TripMachine;
use crate::repository::TripRepository;

/// Fans commands out to a fixed set of worker tasks, one queue each. A user
/// always lands on the same queue and each worker handles its queue one
/// message at a time, so a user's commands are applied in the order they were
/// submitted while different users proceed in parallel.
pub struct Dispatcher {
    shards: Vec<mpsc::Sender<CommandMessage>>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn spawn<R, C, S>(
        machine: Arc<TripMachine<R, C>>,
        sink: Arc<S>,
        shards: usize,
        capacity: usize,
    ) -> Self
    where
        R: TripRepository + 'static,
        C: Clock + 'static,
        S: ReplySink + 'static,
    {
        let shards = shards.max(1);
        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);

        for shard in 0..shards {
            let (tx, mut rx) = mpsc::channel::<CommandMessage>(capacity.max(1));
            let machine = machine.clone();
            let sink = sink.clone();
            workers.push(tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    if let Err(e) =
                        message_processor::handle_message(&*machine, &*sink, message).await
                    {
                        error!("Error processing message on shard {}: {}", shard, e);
                    }
                }
            }));
            senders.push(tx);
        }

        info!("Dispatcher started with {} shards", shards);
        Self {
            shards: senders,
            workers,
        }
    }

    /// Queues a command behind the user's earlier ones. Waits while the
    /// user's queue is full.
    pub async fn submit(&self, message: CommandMessage) -> anyhow::Result<()> {
        let shard = (message.user_id.as_u128() % self.shards.len() as u128) as usize;
        self.shards[shard]
            .send(message)
            .await
            .map_err(|_| anyhow!("dispatcher shard {} has stopped", shard))
    }

    /// Stops accepting commands and waits for every queued one to finish.
    pub async fn shutdown(self) {
        drop(self.shards);
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("Dispatcher worker failed: {}", e);
            }
        }
        info!("Dispatcher drained");
    }
}
