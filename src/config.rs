use std::env::var;
use std::str::FromStr;

use dotenvy::dotenv;

pub struct Config {
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub nats_url: String,
    pub queue_stream: String,
    pub queue_subject_prefix: String,
    pub queue_pull_batch: usize,
    pub queue_ack_wait_seconds: u64,
    pub queue_max_deliver: i64,
    pub queue_retry_delay_seconds: u64,
    pub queue_dedupe_window_seconds: u64,
    /// Max concurrent campaign-kickoff jobs.
    pub dispatcher_concurrency: usize,
    /// Max concurrent per-contact dispatch jobs.
    pub contact_concurrency: usize,
    /// Max concurrent sequence-step jobs.
    pub sequence_concurrency: usize,
    pub send_timeout_seconds: u64,
    pub whatsapp_api_url: String,
    pub telegram_api_url: String,
    pub realtime_url: Option<String>,
    pub lead_webhook_url: Option<String>,
}

impl Config {
    pub fn try_parse() -> Result<Config, &'static str> {
        let _ = dotenv();

        Ok(Config {
            port: var("PORT")
                .map_err(|_| "An error occured while getting PORT env param")?
                .parse::<u16>()
                .map_err(|_| "An error occured while parsing PORT env param")?,
            host: var("HOST").map_err(|_| "An error occured while getting HOST env param")?,
            database_url: var("DATABASE_URL")
                .map_err(|_| "An error occured while getting DATABASE_URL env param")?,
            database_max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10),
            nats_url: var("NATS_URL")
                .map_err(|_| "An error occured while getting NATS_URL env param")?,
            queue_stream: var("QUEUE_STREAM").unwrap_or_else(|_| "outreach-jobs".to_string()),
            queue_subject_prefix: var("QUEUE_SUBJECT_PREFIX")
                .unwrap_or_else(|_| "outreach.jobs".to_string()),
            queue_pull_batch: parsed_or("QUEUE_PULL_BATCH", 16),
            queue_ack_wait_seconds: parsed_or("QUEUE_ACK_WAIT_SECONDS", 120),
            queue_max_deliver: parsed_or("QUEUE_MAX_DELIVER", 5),
            queue_retry_delay_seconds: parsed_or("QUEUE_RETRY_DELAY_SECONDS", 30),
            queue_dedupe_window_seconds: parsed_or("QUEUE_DEDUPE_WINDOW_SECONDS", 600),
            dispatcher_concurrency: parsed_or("DISPATCHER_CONCURRENCY", 2),
            contact_concurrency: parsed_or("CONTACT_CONCURRENCY", 8),
            sequence_concurrency: parsed_or("SEQUENCE_CONCURRENCY", 8),
            send_timeout_seconds: parsed_or("SEND_TIMEOUT_SECONDS", 15),
            whatsapp_api_url: var("WHATSAPP_API_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com".to_string()),
            telegram_api_url: var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            realtime_url: var("REALTIME_URL").ok(),
            lead_webhook_url: var("LEAD_WEBHOOK_URL").ok(),
        })
    }
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> T {
    var(name)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}
