use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    models::{
        Campaign, CampaignContact, CampaignStatus, ChannelType, Client, ContactStatus,
        Conversation, ConversationStatus, CredentialsStatus, FollowUp, FollowUpStatus, Message,
        MessageStatus, SendingCredentials, SequenceRule,
    },
    repositories::{
        CampaignContactRepository, CampaignRepository, ClientRepository, ConversationRepository,
        CredentialsRepository, FollowUpRepository, MessageRepository, SequenceRuleRepository,
    },
};

#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: Arc<RwLock<HashMap<Uuid, Campaign>>>,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, campaign: Campaign) {
        self.campaigns.write().await.insert(campaign.id, campaign);
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Campaign>> {
        Ok(self.campaigns.read().await.get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: CampaignStatus) -> anyhow::Result<()> {
        let mut campaigns = self.campaigns.write().await;
        if let Some(campaign) = campaigns.get_mut(&id) {
            campaign.status = status;
            campaign.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCampaignContactRepository {
    contacts: Arc<RwLock<HashMap<Uuid, CampaignContact>>>,
}

impl InMemoryCampaignContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, contact: CampaignContact) {
        self.contacts.write().await.insert(contact.id, contact);
    }
}

#[async_trait]
impl CampaignContactRepository for InMemoryCampaignContactRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<CampaignContact>> {
        Ok(self.contacts.read().await.get(&id).cloned())
    }

    async fn list_pending(&self, campaign_id: Uuid) -> anyhow::Result<Vec<CampaignContact>> {
        let contacts = self.contacts.read().await;
        let mut pending: Vec<CampaignContact> = contacts
            .values()
            .filter(|c| c.campaign_id == campaign_id && c.status == ContactStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|c| c.created_at);
        Ok(pending)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()> {
        let mut contacts = self.contacts.write().await;
        if let Some(contact) = contacts.get_mut(&id) {
            contact.status = status;
            contact.error = error.map(str::to_string);
        }
        Ok(())
    }

    async fn count_open(&self, campaign_id: Uuid) -> anyhow::Result<u64> {
        let contacts = self.contacts.read().await;
        Ok(contacts
            .values()
            .filter(|c| c.campaign_id == campaign_id && !c.status.is_terminal())
            .count() as u64)
    }
}

#[derive(Default)]
pub struct InMemorySequenceRuleRepository {
    rules: Arc<RwLock<HashMap<Uuid, SequenceRule>>>,
}

impl InMemorySequenceRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, rule: SequenceRule) {
        self.rules.write().await.insert(rule.id, rule);
    }
}

#[async_trait]
impl SequenceRuleRepository for InMemorySequenceRuleRepository {
    async fn list_for_workspace(&self, workspace_id: Uuid) -> anyhow::Result<Vec<SequenceRule>> {
        let rules = self.rules.read().await;
        let mut listed: Vec<SequenceRule> = rules
            .values()
            .filter(|r| r.workspace_id == workspace_id)
            .cloned()
            .collect();
        listed.sort_by_key(|r| r.created_at);
        Ok(listed)
    }
}

#[derive(Default)]
pub struct InMemoryFollowUpRepository {
    follow_ups: Arc<RwLock<HashMap<Uuid, FollowUp>>>,
}

impl InMemoryFollowUpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, follow_up: FollowUp) {
        self.follow_ups.write().await.insert(follow_up.id, follow_up);
    }
}

#[async_trait]
impl FollowUpRepository for InMemoryFollowUpRepository {
    async fn insert(&self, follow_up: &FollowUp) -> anyhow::Result<()> {
        self.follow_ups
            .write()
            .await
            .insert(follow_up.id, follow_up.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<FollowUp>> {
        Ok(self.follow_ups.read().await.get(&id).cloned())
    }

    async fn find_active(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<FollowUp>> {
        let follow_ups = self.follow_ups.read().await;
        Ok(follow_ups
            .values()
            .find(|f| {
                f.workspace_id == workspace_id
                    && f.client_id == client_id
                    && f.status == FollowUpStatus::Active
            })
            .cloned())
    }

    async fn set_status(&self, id: Uuid, status: FollowUpStatus) -> anyhow::Result<()> {
        let mut follow_ups = self.follow_ups.write().await;
        if let Some(follow_up) = follow_ups.get_mut(&id) {
            follow_up.status = status;
        }
        Ok(())
    }

    async fn advance(
        &self,
        id: Uuid,
        step_order: i32,
        next_message_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut follow_ups = self.follow_ups.write().await;
        if let Some(follow_up) = follow_ups.get_mut(&id) {
            follow_up.current_step_order = step_order;
            follow_up.next_message_at = Some(next_message_at);
        }
        Ok(())
    }

    async fn complete(
        &self,
        id: Uuid,
        step_order: i32,
        completed_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut follow_ups = self.follow_ups.write().await;
        if let Some(follow_up) = follow_ups.get_mut(&id) {
            follow_up.current_step_order = step_order;
            follow_up.status = FollowUpStatus::Completed;
            follow_up.next_message_at = None;
            follow_up.completed_at = Some(completed_at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: Arc<RwLock<HashMap<Uuid, Client>>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, client: Client) {
        self.clients.write().await.insert(client.id, client);
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Client>> {
        Ok(self.clients.read().await.get(&id).cloned())
    }

    async fn find_by_address(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
        address: &str,
    ) -> anyhow::Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients
            .values()
            .find(|c| {
                c.workspace_id == workspace_id && c.channel == channel && c.address == address
            })
            .cloned())
    }

    async fn insert(&self, client: &Client) -> anyhow::Result<()> {
        self.clients.write().await.insert(client.id, client.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation);
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(&id).cloned())
    }

    async fn find_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<Conversation>> {
        let conversations = self.conversations.read().await;
        Ok(conversations
            .values()
            .find(|c| {
                c.workspace_id == workspace_id && c.client_id == client_id && c.channel == channel
            })
            .cloned())
    }

    async fn find_open_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<Conversation>> {
        let conversations = self.conversations.read().await;
        let mut open: Vec<&Conversation> = conversations
            .values()
            .filter(|c| {
                c.workspace_id == workspace_id
                    && c.client_id == client_id
                    && c.status == ConversationStatus::Open
            })
            .collect();
        open.sort_by_key(|c| c.last_message_at);
        Ok(open.last().map(|c| (*c).clone()))
    }

    async fn insert(&self, conversation: &Conversation) -> anyhow::Result<()> {
        self.conversations
            .write()
            .await
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()> {
        let mut conversations = self.conversations.write().await;
        if let Some(conversation) = conversations.get_mut(&id) {
            conversation.last_message_at = Some(at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Arc<RwLock<HashMap<Uuid, Message>>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.messages.read().await.values().cloned().collect();
        messages.sort_by_key(|m| m.created_at);
        messages
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn insert(&self, message: &Message) -> anyhow::Result<()> {
        self.messages
            .write()
            .await
            .insert(message.id, message.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Message>> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: MessageStatus) -> anyhow::Result<()> {
        let mut messages = self.messages.write().await;
        if let Some(message) = messages.get_mut(&id) {
            message.status = status;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCredentialsRepository {
    credentials: Arc<RwLock<HashMap<Uuid, SendingCredentials>>>,
}

impl InMemoryCredentialsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, credentials: SendingCredentials) {
        self.credentials
            .write()
            .await
            .insert(credentials.id, credentials);
    }
}

#[async_trait]
impl CredentialsRepository for InMemoryCredentialsRepository {
    async fn find_active(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<SendingCredentials>> {
        let credentials = self.credentials.read().await;
        Ok(credentials
            .values()
            .find(|c| {
                c.workspace_id == workspace_id
                    && c.channel == channel
                    && c.status == CredentialsStatus::Active
            })
            .cloned())
    }
}
