use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::domain::{
    models::{
        Campaign, CampaignContact, CampaignStatus, ChannelType, Client, ContactStatus,
        Conversation, ConversationStatus, CredentialsStatus, FollowUp, FollowUpStatus, Message,
        MessageMeta, MessageStatus, SenderKind, SendingCredentials, SequenceRule,
    },
    repositories::{
        CampaignContactRepository, CampaignRepository, ClientRepository, ConversationRepository,
        CredentialsRepository, FollowUpRepository, MessageRepository, SequenceRuleRepository,
    },
    scheduling::SendWindow,
};

pub type PgPool = Pool<Postgres>;

fn channel_to_str(channel: ChannelType) -> &'static str {
    match channel {
        ChannelType::WhatsApp => "whatsapp",
        ChannelType::Telegram => "telegram",
    }
}

fn channel_from_str(value: &str) -> ChannelType {
    match value {
        "telegram" => ChannelType::Telegram,
        _ => ChannelType::WhatsApp,
    }
}

fn weekday_from_int(value: i16) -> Option<Weekday> {
    match value {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn campaign_status_to_str(status: CampaignStatus) -> &'static str {
    match status {
        CampaignStatus::Pending => "pending",
        CampaignStatus::Running => "running",
        CampaignStatus::Completed => "completed",
        CampaignStatus::Failed => "failed",
        CampaignStatus::Paused => "paused",
    }
}

fn campaign_status_from_str(value: &str) -> CampaignStatus {
    match value {
        "running" => CampaignStatus::Running,
        "completed" => CampaignStatus::Completed,
        "failed" => CampaignStatus::Failed,
        "paused" => CampaignStatus::Paused,
        _ => CampaignStatus::Pending,
    }
}

fn contact_status_to_str(status: ContactStatus) -> &'static str {
    match status {
        ContactStatus::Pending => "pending",
        ContactStatus::Scheduled => "scheduled",
        ContactStatus::Failed => "failed",
        ContactStatus::Sent => "sent",
    }
}

fn contact_status_from_str(value: &str) -> ContactStatus {
    match value {
        "scheduled" => ContactStatus::Scheduled,
        "failed" => ContactStatus::Failed,
        "sent" => ContactStatus::Sent,
        _ => ContactStatus::Pending,
    }
}

fn follow_up_status_to_str(status: FollowUpStatus) -> &'static str {
    match status {
        FollowUpStatus::Active => "active",
        FollowUpStatus::Paused => "paused",
        FollowUpStatus::Completed => "completed",
        FollowUpStatus::Failed => "failed",
        FollowUpStatus::Converted => "converted",
        FollowUpStatus::Cancelled => "cancelled",
    }
}

fn follow_up_status_from_str(value: &str) -> FollowUpStatus {
    match value {
        "paused" => FollowUpStatus::Paused,
        "completed" => FollowUpStatus::Completed,
        "failed" => FollowUpStatus::Failed,
        "converted" => FollowUpStatus::Converted,
        "cancelled" => FollowUpStatus::Cancelled,
        _ => FollowUpStatus::Active,
    }
}

fn message_status_to_str(status: &MessageStatus) -> &'static str {
    match status {
        MessageStatus::Pending => "pending",
        MessageStatus::Sent => "sent",
        MessageStatus::Failed => "failed",
    }
}

fn message_status_from_str(value: &str) -> MessageStatus {
    match value {
        "sent" => MessageStatus::Sent,
        "failed" => MessageStatus::Failed,
        _ => MessageStatus::Pending,
    }
}

fn sender_to_str(sender: SenderKind) -> &'static str {
    match sender {
        SenderKind::Operator => "operator",
        SenderKind::Automated => "automated",
        SenderKind::Contact => "contact",
    }
}

fn sender_from_str(value: &str) -> SenderKind {
    match value {
        "automated" => SenderKind::Automated,
        "contact" => SenderKind::Contact,
        _ => SenderKind::Operator,
    }
}

#[derive(Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct CampaignRecord {
    id: Uuid,
    workspace_id: Uuid,
    channel: String,
    body: String,
    status: String,
    send_interval_seconds: i32,
    window_start: NaiveTime,
    window_end: NaiveTime,
    allowed_days: Vec<i16>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CampaignRecord> for Campaign {
    fn from(record: CampaignRecord) -> Self {
        Campaign {
            id: record.id,
            workspace_id: record.workspace_id,
            channel: channel_from_str(&record.channel),
            body: record.body,
            status: campaign_status_from_str(&record.status),
            send_interval_seconds: record.send_interval_seconds.max(0) as u32,
            window: SendWindow {
                start: record.window_start,
                end: record.window_end,
                days: record
                    .allowed_days
                    .into_iter()
                    .filter_map(weekday_from_int)
                    .collect(),
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Campaign>> {
        let record = sqlx::query_as::<_, CampaignRecord>(
            r#"
            SELECT id, workspace_id, channel, body, status, send_interval_seconds,
                   window_start, window_end, allowed_days, created_at, updated_at
            FROM campaigns WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Campaign::from))
    }

    async fn set_status(&self, id: Uuid, status: CampaignStatus) -> anyhow::Result<()> {
        sqlx::query(
            r#"UPDATE campaigns SET status = $2, updated_at = now() WHERE id = $1"#,
        )
        .bind(id)
        .bind(campaign_status_to_str(status))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresCampaignContactRepository {
    pool: PgPool,
}

impl PostgresCampaignContactRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct ContactRecord {
    id: Uuid,
    campaign_id: Uuid,
    address: String,
    display_name: Option<String>,
    variables: serde_json::Value,
    status: String,
    error: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ContactRecord> for CampaignContact {
    fn from(record: ContactRecord) -> Self {
        let variables: HashMap<String, String> =
            serde_json::from_value(record.variables).unwrap_or_default();
        CampaignContact {
            id: record.id,
            campaign_id: record.campaign_id,
            address: record.address,
            display_name: record.display_name,
            variables,
            status: contact_status_from_str(&record.status),
            error: record.error,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl CampaignContactRepository for PostgresCampaignContactRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<CampaignContact>> {
        let record = sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, campaign_id, address, display_name, variables, status, error, created_at
            FROM campaign_contacts WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(CampaignContact::from))
    }

    async fn list_pending(&self, campaign_id: Uuid) -> anyhow::Result<Vec<CampaignContact>> {
        let records = sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, campaign_id, address, display_name, variables, status, error, created_at
            FROM campaign_contacts
            WHERE campaign_id = $1 AND status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(CampaignContact::from).collect())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE campaign_contacts SET status = $2, error = $3 WHERE id = $1"#)
            .bind(id)
            .bind(contact_status_to_str(status))
            .bind(error)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count_open(&self, campaign_id: Uuid) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM campaign_contacts
            WHERE campaign_id = $1 AND status IN ('pending', 'scheduled')
            "#,
        )
        .bind(campaign_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }
}

#[derive(Clone)]
pub struct PostgresSequenceRuleRepository {
    pool: PgPool,
}

impl PostgresSequenceRuleRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct SequenceRuleRecord {
    id: Uuid,
    workspace_id: Uuid,
    delay_ms: i64,
    template: String,
    created_at: DateTime<Utc>,
}

impl From<SequenceRuleRecord> for SequenceRule {
    fn from(record: SequenceRuleRecord) -> Self {
        SequenceRule {
            id: record.id,
            workspace_id: record.workspace_id,
            delay_ms: record.delay_ms,
            template: record.template,
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl SequenceRuleRepository for PostgresSequenceRuleRepository {
    async fn list_for_workspace(&self, workspace_id: Uuid) -> anyhow::Result<Vec<SequenceRule>> {
        let records = sqlx::query_as::<_, SequenceRuleRecord>(
            r#"
            SELECT id, workspace_id, delay_ms, template, created_at
            FROM sequence_rules WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records.into_iter().map(SequenceRule::from).collect())
    }
}

#[derive(Clone)]
pub struct PostgresFollowUpRepository {
    pool: PgPool,
}

impl PostgresFollowUpRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct FollowUpRecord {
    id: Uuid,
    workspace_id: Uuid,
    client_id: Uuid,
    conversation_id: Uuid,
    status: String,
    current_step_order: i32,
    next_message_at: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl From<FollowUpRecord> for FollowUp {
    fn from(record: FollowUpRecord) -> Self {
        FollowUp {
            id: record.id,
            workspace_id: record.workspace_id,
            client_id: record.client_id,
            conversation_id: record.conversation_id,
            status: follow_up_status_from_str(&record.status),
            current_step_order: record.current_step_order,
            next_message_at: record.next_message_at,
            started_at: record.started_at,
            completed_at: record.completed_at,
        }
    }
}

#[async_trait]
impl FollowUpRepository for PostgresFollowUpRepository {
    async fn insert(&self, follow_up: &FollowUp) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO follow_ups (
                id, workspace_id, client_id, conversation_id, status,
                current_step_order, next_message_at, started_at, completed_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(follow_up.id)
        .bind(follow_up.workspace_id)
        .bind(follow_up.client_id)
        .bind(follow_up.conversation_id)
        .bind(follow_up_status_to_str(follow_up.status))
        .bind(follow_up.current_step_order)
        .bind(follow_up.next_message_at)
        .bind(follow_up.started_at)
        .bind(follow_up.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<FollowUp>> {
        let record = sqlx::query_as::<_, FollowUpRecord>(
            r#"
            SELECT id, workspace_id, client_id, conversation_id, status,
                   current_step_order, next_message_at, started_at, completed_at
            FROM follow_ups WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(FollowUp::from))
    }

    async fn find_active(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<FollowUp>> {
        let record = sqlx::query_as::<_, FollowUpRecord>(
            r#"
            SELECT id, workspace_id, client_id, conversation_id, status,
                   current_step_order, next_message_at, started_at, completed_at
            FROM follow_ups
            WHERE workspace_id = $1 AND client_id = $2 AND status = 'active'
            LIMIT 1
            "#,
        )
        .bind(workspace_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(FollowUp::from))
    }

    async fn set_status(&self, id: Uuid, status: FollowUpStatus) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE follow_ups SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(follow_up_status_to_str(status))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn advance(
        &self,
        id: Uuid,
        step_order: i32,
        next_message_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE follow_ups
            SET current_step_order = $2, next_message_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(step_order)
        .bind(next_message_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn complete(
        &self,
        id: Uuid,
        step_order: i32,
        completed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE follow_ups
            SET current_step_order = $2, status = 'completed',
                next_message_at = NULL, completed_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(step_order)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct ClientRecord {
    id: Uuid,
    workspace_id: Uuid,
    address: String,
    display_name: Option<String>,
    channel: String,
    created_at: DateTime<Utc>,
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Client {
            id: record.id,
            workspace_id: record.workspace_id,
            address: record.address,
            display_name: record.display_name,
            channel: channel_from_str(&record.channel),
            created_at: record.created_at,
        }
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Client>> {
        let record = sqlx::query_as::<_, ClientRecord>(
            r#"
            SELECT id, workspace_id, address, display_name, channel, created_at
            FROM clients WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Client::from))
    }

    async fn find_by_address(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
        address: &str,
    ) -> anyhow::Result<Option<Client>> {
        let record = sqlx::query_as::<_, ClientRecord>(
            r#"
            SELECT id, workspace_id, address, display_name, channel, created_at
            FROM clients
            WHERE workspace_id = $1 AND channel = $2 AND address = $3
            "#,
        )
        .bind(workspace_id)
        .bind(channel_to_str(channel))
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Client::from))
    }

    async fn insert(&self, client: &Client) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, workspace_id, address, display_name, channel, created_at)
            VALUES ($1,$2,$3,$4,$5,$6)
            "#,
        )
        .bind(client.id)
        .bind(client.workspace_id)
        .bind(&client.address)
        .bind(&client.display_name)
        .bind(channel_to_str(client.channel))
        .bind(client.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresConversationRepository {
    pool: PgPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct ConversationRecord {
    id: Uuid,
    workspace_id: Uuid,
    client_id: Uuid,
    channel: String,
    provider_handle: String,
    status: String,
    last_message_at: Option<DateTime<Utc>>,
}

impl From<ConversationRecord> for Conversation {
    fn from(record: ConversationRecord) -> Self {
        Conversation {
            id: record.id,
            workspace_id: record.workspace_id,
            client_id: record.client_id,
            channel: channel_from_str(&record.channel),
            provider_handle: record.provider_handle,
            status: match record.status.as_str() {
                "closed" => ConversationStatus::Closed,
                _ => ConversationStatus::Open,
            },
            last_message_at: record.last_message_at,
        }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT id, workspace_id, client_id, channel, provider_handle, status, last_message_at
            FROM conversations WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Conversation::from))
    }

    async fn find_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT id, workspace_id, client_id, channel, provider_handle, status, last_message_at
            FROM conversations
            WHERE workspace_id = $1 AND client_id = $2 AND channel = $3
            "#,
        )
        .bind(workspace_id)
        .bind(client_id)
        .bind(channel_to_str(channel))
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Conversation::from))
    }

    async fn find_open_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<Conversation>> {
        let record = sqlx::query_as::<_, ConversationRecord>(
            r#"
            SELECT id, workspace_id, client_id, channel, provider_handle, status, last_message_at
            FROM conversations
            WHERE workspace_id = $1 AND client_id = $2 AND status = 'open'
            ORDER BY last_message_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(workspace_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Conversation::from))
    }

    async fn insert(&self, conversation: &Conversation) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, workspace_id, client_id, channel, provider_handle, status, last_message_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.workspace_id)
        .bind(conversation.client_id)
        .bind(channel_to_str(conversation.channel))
        .bind(&conversation.provider_handle)
        .bind(match conversation.status {
            ConversationStatus::Open => "open",
            ConversationStatus::Closed => "closed",
        })
        .bind(conversation.last_message_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE conversations SET last_message_at = $2 WHERE id = $1"#)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    conversation_id: Uuid,
    sender: String,
    content: String,
    status: String,
    send_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    meta: serde_json::Value,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        let meta: MessageMeta = serde_json::from_value(record.meta).unwrap_or_default();
        Message {
            id: record.id,
            conversation_id: record.conversation_id,
            sender: sender_from_str(&record.sender),
            content: record.content,
            status: message_status_from_str(&record.status),
            send_at: record.send_at,
            created_at: record.created_at,
            meta,
        }
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (
                id, conversation_id, sender, content, status, send_at, created_at, meta
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(sender_to_str(message.sender))
        .bind(&message.content)
        .bind(message_status_to_str(&message.status))
        .bind(message.send_at)
        .bind(message.created_at)
        .bind(serde_json::to_value(&message.meta)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Message>> {
        let record = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, conversation_id, sender, content, status, send_at, created_at, meta
            FROM messages WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Message::from))
    }

    async fn set_status(&self, id: Uuid, status: MessageStatus) -> anyhow::Result<()> {
        sqlx::query(r#"UPDATE messages SET status = $2 WHERE id = $1"#)
            .bind(id)
            .bind(message_status_to_str(&status))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PostgresCredentialsRepository {
    pool: PgPool,
}

impl PostgresCredentialsRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    workspace_id: Uuid,
    channel: String,
    access_token: String,
    api_url: Option<String>,
    status: String,
    updated_at: DateTime<Utc>,
}

impl From<CredentialsRecord> for SendingCredentials {
    fn from(record: CredentialsRecord) -> Self {
        SendingCredentials {
            id: record.id,
            workspace_id: record.workspace_id,
            channel: channel_from_str(&record.channel),
            access_token: record.access_token,
            api_url: record.api_url,
            status: match record.status.as_str() {
                "inactive" => CredentialsStatus::Inactive,
                _ => CredentialsStatus::Active,
            },
            updated_at: record.updated_at,
        }
    }
}

#[async_trait]
impl CredentialsRepository for PostgresCredentialsRepository {
    async fn find_active(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<SendingCredentials>> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            r#"
            SELECT id, workspace_id, channel, access_token, api_url, status, updated_at
            FROM sending_credentials
            WHERE workspace_id = $1 AND channel = $2 AND status = 'active'
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(workspace_id)
        .bind(channel_to_str(channel))
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(SendingCredentials::from))
    }
}
