use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;

/// Outbound delivery of a plain text message to one subscriber.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<()> {
        self.send_message(ChatId(recipient), text).await?;
        Ok(())
    }
}

/// What happened to a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed,
}

/// Delivered/failed tally for one pass over a set of recipients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub delivered: usize,
    pub failed: usize,
}

impl PassSummary {
    pub fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Failed => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: PassSummary) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Sends one message, turning a transport error into `Delivery::Failed`.
/// Blocked bots, deleted accounts and network errors are all treated alike.
pub async fn deliver(messenger: &dyn Messenger, recipient: i64, text: &str) -> Delivery {
    match messenger.send_text(recipient, text).await {
        Ok(()) => Delivery::Delivered,
        Err(e) => {
            tracing::warn!("Failed to deliver message to {}: {}", recipient, e);
            Delivery::Failed
        }
    }
}
