#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};
use tokio::sync::Mutex;
use uuid::Uuid;

use outreach::application::services::{
    job_queue::{EnqueueOptions, JobQueue},
    notifier::RealtimeNotifier,
    resolver::LeadHook,
    sender::{ChannelSender, ProviderReceipt},
};
use outreach::domain::events::Job;
use outreach::domain::models::{
    Campaign, CampaignContact, CampaignStatus, ChannelType, Client, ContactStatus, Conversation,
    ConversationStatus, CredentialsStatus, FollowUp, FollowUpStatus, SendingCredentials,
    SequenceRule,
};
use outreach::domain::scheduling::SendWindow;

/// Friday 2026-08-07 17:59 UTC, one minute before the business window ends.
pub fn friday_late() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 7, 17, 59, 0).unwrap()
}

pub fn business_window() -> SendWindow {
    SendWindow {
        start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        days: vec![
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ],
    }
}

pub fn test_campaign(workspace_id: Uuid, send_interval_seconds: u32) -> Campaign {
    let now = friday_late();
    Campaign {
        id: Uuid::new_v4(),
        workspace_id,
        channel: ChannelType::WhatsApp,
        body: "Hi {{name}}, check out our offer!".to_string(),
        status: CampaignStatus::Pending,
        send_interval_seconds,
        window: business_window(),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_contact(campaign_id: Uuid, address: &str, name: &str, order: i64) -> CampaignContact {
    CampaignContact {
        id: Uuid::new_v4(),
        campaign_id,
        address: address.to_string(),
        display_name: Some(name.to_string()),
        variables: HashMap::from([("name".to_string(), name.to_string())]),
        status: ContactStatus::Pending,
        error: None,
        created_at: friday_late() - TimeDelta::hours(1) + TimeDelta::seconds(order),
    }
}

pub fn active_credentials(workspace_id: Uuid, channel: ChannelType) -> SendingCredentials {
    SendingCredentials {
        id: Uuid::new_v4(),
        workspace_id,
        channel,
        access_token: "token-123".to_string(),
        api_url: None,
        status: CredentialsStatus::Active,
        updated_at: friday_late(),
    }
}

pub fn test_client(workspace_id: Uuid, address: &str, name: &str) -> Client {
    Client {
        id: Uuid::new_v4(),
        workspace_id,
        address: address.to_string(),
        display_name: Some(name.to_string()),
        channel: ChannelType::WhatsApp,
        created_at: friday_late(),
    }
}

pub fn open_conversation(client: &Client) -> Conversation {
    Conversation {
        id: Uuid::new_v4(),
        workspace_id: client.workspace_id,
        client_id: client.id,
        channel: client.channel,
        provider_handle: client.address.clone(),
        status: ConversationStatus::Open,
        last_message_at: None,
    }
}

pub fn test_rule(workspace_id: Uuid, delay_ms: i64, template: &str, order: i64) -> SequenceRule {
    SequenceRule {
        id: Uuid::new_v4(),
        workspace_id,
        delay_ms,
        template: template.to_string(),
        created_at: friday_late() - TimeDelta::days(30) + TimeDelta::seconds(order),
    }
}

pub fn active_follow_up(client: &Client, conversation: &Conversation) -> FollowUp {
    FollowUp {
        id: Uuid::new_v4(),
        workspace_id: client.workspace_id,
        client_id: client.id,
        conversation_id: conversation.id,
        status: FollowUpStatus::Active,
        current_step_order: 0,
        next_message_at: None,
        started_at: friday_late(),
        completed_at: None,
    }
}

/// Records enqueued jobs; keys listed in `fail_keys` fail the enqueue.
pub struct RecordingQueue {
    jobs: Mutex<Vec<(Job, EnqueueOptions)>>,
    fail_keys: HashSet<String>,
}

impl RecordingQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            jobs: Mutex::new(Vec::new()),
            fail_keys: HashSet::new(),
        })
    }

    pub fn failing_for(keys: impl IntoIterator<Item = String>) -> Arc<Self> {
        Arc::new(Self {
            jobs: Mutex::new(Vec::new()),
            fail_keys: keys.into_iter().collect(),
        })
    }

    pub async fn enqueued(&self) -> Vec<(Job, EnqueueOptions)> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl JobQueue for RecordingQueue {
    async fn enqueue(&self, job: Job, options: EnqueueOptions) -> anyhow::Result<()> {
        if self.fail_keys.contains(&options.idempotency_key) {
            anyhow::bail!("queue unavailable");
        }
        self.jobs.lock().await.push((job, options));
        Ok(())
    }
}

/// Pretends to be a provider; flips to failure via `fail`.
pub struct StubSender {
    channel: ChannelType,
    pub fail: AtomicBool,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubSender {
    pub fn new(channel: ChannelType) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(channel: ChannelType) -> Arc<Self> {
        Arc::new(Self {
            channel,
            fail: AtomicBool::new(true),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub async fn sent(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ChannelSender for StubSender {
    fn channel(&self) -> ChannelType {
        self.channel
    }

    async fn send(
        &self,
        _credentials: &SendingCredentials,
        destination: &str,
        body: &str,
    ) -> anyhow::Result<ProviderReceipt> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("provider rejected message");
        }
        self.calls
            .lock()
            .await
            .push((destination.to_string(), body.to_string()));
        Ok(ProviderReceipt::default())
    }
}

pub struct CountingNotifier {
    events: Mutex<Vec<String>>,
}

impl CountingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }

    pub async fn events(&self) -> Vec<String> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl RealtimeNotifier for CountingNotifier {
    async fn publish(
        &self,
        _workspace_id: Uuid,
        event: &str,
        _payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        self.events.lock().await.push(event.to_string());
        Ok(())
    }
}

pub struct RecordingLeadHook {
    created: Mutex<Vec<Uuid>>,
}

impl RecordingLeadHook {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            created: Mutex::new(Vec::new()),
        })
    }

    pub async fn created(&self) -> Vec<Uuid> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl LeadHook for RecordingLeadHook {
    async fn client_created(&self, _workspace_id: Uuid, client: &Client) -> anyhow::Result<()> {
        self.created.lock().await.push(client.id);
        Ok(())
    }
}
