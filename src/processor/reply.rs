use anyhow::Result;
use async_trait::async_trait;

use crate::models::reply::Reply;

/// Where command replies are published.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<()>;
}
