use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{
    Campaign, CampaignContact, CampaignStatus, ChannelType, Client, ContactStatus, Conversation,
    FollowUp, FollowUpStatus, Message, MessageStatus, SendingCredentials, SequenceRule,
};

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Campaign>>;
    async fn set_status(&self, id: Uuid, status: CampaignStatus) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CampaignContactRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<CampaignContact>>;
    /// Pending contacts of one campaign, ordered by creation.
    async fn list_pending(&self, campaign_id: Uuid) -> anyhow::Result<Vec<CampaignContact>>;
    async fn set_status(
        &self,
        id: Uuid,
        status: ContactStatus,
        error: Option<&str>,
    ) -> anyhow::Result<()>;
    /// Contacts still awaiting dispatch (Pending or Scheduled).
    async fn count_open(&self, campaign_id: Uuid) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait SequenceRuleRepository: Send + Sync {
    /// The workspace's full rule list, ascending by creation timestamp.
    /// This ordering is the sequence topology.
    async fn list_for_workspace(&self, workspace_id: Uuid) -> anyhow::Result<Vec<SequenceRule>>;
}

#[async_trait]
pub trait FollowUpRepository: Send + Sync {
    async fn insert(&self, follow_up: &FollowUp) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<FollowUp>>;
    async fn find_active(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<FollowUp>>;
    async fn set_status(&self, id: Uuid, status: FollowUpStatus) -> anyhow::Result<()>;
    /// Record a processed step that has a successor: step order advances and
    /// the next send is scheduled, status stays Active.
    async fn advance(
        &self,
        id: Uuid,
        step_order: i32,
        next_message_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    /// Record the final processed step: Completed, no next send.
    async fn complete(
        &self,
        id: Uuid,
        step_order: i32,
        completed_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Client>>;
    async fn find_by_address(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
        address: &str,
    ) -> anyhow::Result<Option<Client>>;
    async fn insert(&self, client: &Client) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Conversation>>;
    async fn find_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<Conversation>>;
    /// Most recent Open conversation of a client, any channel.
    async fn find_open_for_client(
        &self,
        workspace_id: Uuid,
        client_id: Uuid,
    ) -> anyhow::Result<Option<Conversation>>;
    async fn insert(&self, conversation: &Conversation) -> anyhow::Result<()>;
    async fn touch_last_message(&self, id: Uuid, at: DateTime<Utc>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(&self, message: &Message) -> anyhow::Result<()>;
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Message>>;
    async fn set_status(&self, id: Uuid, status: MessageStatus) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CredentialsRepository: Send + Sync {
    async fn find_active(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
    ) -> anyhow::Result<Option<SendingCredentials>>;
}
