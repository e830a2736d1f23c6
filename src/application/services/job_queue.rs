use std::time::Duration;

use async_trait::async_trait;

use crate::domain::events::Job;

/// Options attached to every enqueue. The idempotency key makes a repeated
/// enqueue of logically-equivalent work a no-op at the queue layer.
#[derive(Debug, Clone)]
pub struct EnqueueOptions {
    pub delay: Duration,
    pub idempotency_key: String,
}

impl EnqueueOptions {
    pub fn immediate(idempotency_key: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            idempotency_key: idempotency_key.into(),
        }
    }

    pub fn delayed(delay: Duration, idempotency_key: impl Into<String>) -> Self {
        Self {
            delay,
            idempotency_key: idempotency_key.into(),
        }
    }
}

/// Delayed job queue. Delivery is at-least-once with no cross-key ordering
/// guarantee.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: Job, options: EnqueueOptions) -> anyhow::Result<()>;
}
