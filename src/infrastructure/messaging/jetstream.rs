use std::sync::Arc;
use std::time::Duration;

use async_nats::HeaderMap;
use async_nats::jetstream::{
    self, AckKind,
    consumer::{AckPolicy, PullConsumer, pull},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{error, warn};

use crate::application::{
    handlers::JobHandler,
    services::job_queue::{EnqueueOptions, JobQueue},
};
use crate::domain::events::{Job, JobKind};

/// Header carrying the earliest time a job may be handled. JetStream has no
/// native delayed delivery; a consumer that sees a not-yet-due job NAKs it
/// back with the remaining delay.
const NOT_BEFORE_HEADER: &str = "Outreach-Not-Before";
/// JetStream deduplicates on this header inside the stream's duplicate
/// window, which is what makes enqueue idempotency keys effective.
const MSG_ID_HEADER: &str = "Nats-Msg-Id";

#[derive(Clone)]
pub struct QueueConfig {
    pub url: String,
    pub stream: String,
    pub subject_prefix: String,
    pub pull_batch: usize,
    pub ack_wait_seconds: u64,
    pub max_deliver: i64,
    pub retry_delay_seconds: u64,
    pub dedupe_window_seconds: u64,
}

pub struct JetstreamQueue {
    context: jetstream::Context,
    config: QueueConfig,
}

impl JetstreamQueue {
    pub async fn connect(config: QueueConfig) -> anyhow::Result<Arc<Self>> {
        let client = async_nats::connect(&config.url).await?;
        let context = jetstream::new(client);

        context
            .get_or_create_stream(jetstream::stream::Config {
                name: config.stream.clone(),
                subjects: vec![format!("{}.>", config.subject_prefix)],
                duplicate_window: Duration::from_secs(config.dedupe_window_seconds),
                ..Default::default()
            })
            .await?;

        Ok(Arc::new(Self { context, config }))
    }

    fn subject(&self, kind: JobKind) -> String {
        format!("{}.{}", self.config.subject_prefix, kind.subject())
    }

    /// One durable pull consumer per job kind, with its own concurrency cap.
    pub async fn worker(
        self: &Arc<Self>,
        kind: JobKind,
        concurrency: usize,
    ) -> anyhow::Result<JetstreamWorker> {
        let stream = self.context.get_stream(&self.config.stream).await?;
        let durable = format!("{}-{}", self.config.stream, kind.subject());
        let consumer = stream
            .get_or_create_consumer(
                &durable,
                pull::Config {
                    durable_name: Some(durable.clone()),
                    filter_subject: self.subject(kind),
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: Duration::from_secs(self.config.ack_wait_seconds),
                    max_deliver: self.config.max_deliver,
                    ..Default::default()
                },
            )
            .await?;

        Ok(JetstreamWorker {
            consumer,
            pull_batch: self.config.pull_batch,
            concurrency,
            retry_delay: Duration::from_secs(self.config.retry_delay_seconds),
        })
    }
}

#[async_trait]
impl JobQueue for JetstreamQueue {
    async fn enqueue(&self, job: Job, options: EnqueueOptions) -> anyhow::Result<()> {
        let subject = self.subject(job.kind());
        let payload = serde_json::to_vec(&job)?;
        let not_before = Utc::now()
            + chrono::TimeDelta::milliseconds(options.delay.as_millis().min(i64::MAX as u128) as i64);

        let mut headers = HeaderMap::new();
        headers.insert(MSG_ID_HEADER, options.idempotency_key.as_str());
        headers.insert(NOT_BEFORE_HEADER, not_before.to_rfc3339().as_str());

        self.context
            .publish_with_headers(subject, headers, payload.into())
            .await?
            .await?;
        Ok(())
    }
}

pub struct JetstreamWorker {
    consumer: PullConsumer,
    pull_batch: usize,
    concurrency: usize,
    retry_delay: Duration,
}

impl JetstreamWorker {
    pub fn spawn(self, handler: Arc<dyn JobHandler>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.run(handler).await {
                error!(error = ?err, "queue worker stopped");
            }
        })
    }

    async fn run(self, handler: Arc<dyn JobHandler>) -> anyhow::Result<()> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        loop {
            let mut batch = self
                .consumer
                .batch()
                .max_messages(self.pull_batch)
                .messages()
                .await?;
            while let Some(message) = batch.next().await {
                match message {
                    Ok(message) => {
                        let permit = semaphore.clone().acquire_owned().await?;
                        let handler = handler.clone();
                        let retry_delay = self.retry_delay;
                        tokio::spawn(async move {
                            Self::process_message(message, handler, retry_delay).await;
                            drop(permit);
                        });
                    }
                    Err(err) => {
                        warn!(error = ?err, "queue batch error");
                    }
                }
            }
        }
    }

    async fn process_message(
        message: jetstream::Message,
        handler: Arc<dyn JobHandler>,
        retry_delay: Duration,
    ) {
        // Not yet due: push the job back with the remaining delay.
        if let Some(remaining) = not_before_remaining(&message, Utc::now()) {
            if let Err(err) = message.ack_with(AckKind::Nak(Some(remaining))).await {
                warn!(error = %err, "failed to delay job");
            }
            return;
        }

        let job: Job = match serde_json::from_slice(&message.payload) {
            Ok(job) => job,
            Err(err) => {
                // Undecodable payloads would redeliver forever; drop them.
                error!(error = %err, "dropping undecodable job payload");
                if let Err(err) = message.ack().await {
                    warn!(error = %err, "failed to ack poison job");
                }
                return;
            }
        };

        match handler.handle(job).await {
            Ok(()) => {
                if let Err(err) = message.ack().await {
                    warn!(error = %err, "failed to ack job");
                }
            }
            Err(err) => {
                // The handler already recorded what it could; redelivery is
                // governed by the consumer's max_deliver and this NAK delay.
                warn!(error = ?err, "job handler failed, scheduling redelivery");
                if let Err(err) = message.ack_with(AckKind::Nak(Some(retry_delay))).await {
                    warn!(error = %err, "failed to nak job");
                }
            }
        }
    }
}

fn not_before_remaining(message: &jetstream::Message, now: DateTime<Utc>) -> Option<Duration> {
    let header = message.headers.as_ref()?.get(NOT_BEFORE_HEADER)?;
    let not_before = DateTime::parse_from_rfc3339(header.as_str()).ok()?;
    (not_before.with_timezone(&Utc) - now).to_std().ok()
}
