use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::application::services::resolver::{ContactResolver, Resolution};
use crate::domain::{
    models::{ChannelType, Client, Conversation, ConversationStatus},
    repositories::{ClientRepository, ConversationRepository},
    value_objects::NormalizedAddress,
};

/// Get-or-create resolution backed by the store. Idempotency comes from the
/// address lookup plus the unique (workspace, client, channel) conversation
/// constraint; a lost race surfaces as a constraint violation and the caller
/// treats the contact as failed.
pub struct StoreResolver {
    clients: Arc<dyn ClientRepository>,
    conversations: Arc<dyn ConversationRepository>,
}

impl StoreResolver {
    pub fn new(
        clients: Arc<dyn ClientRepository>,
        conversations: Arc<dyn ConversationRepository>,
    ) -> Arc<Self> {
        Arc::new(Self {
            clients,
            conversations,
        })
    }
}

#[async_trait]
impl ContactResolver for StoreResolver {
    async fn resolve(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
        address: &NormalizedAddress,
        display_name: Option<&str>,
    ) -> anyhow::Result<Resolution> {
        let (client, client_was_created) = match self
            .clients
            .find_by_address(workspace_id, channel, address.as_str())
            .await?
        {
            Some(client) => (client, false),
            None => {
                let client = Client {
                    id: Uuid::new_v4(),
                    workspace_id,
                    address: address.as_str().to_string(),
                    display_name: display_name.map(str::to_string),
                    channel,
                    created_at: Utc::now(),
                };
                self.clients.insert(&client).await?;
                (client, true)
            }
        };

        let (conversation, conversation_was_created) = match self
            .conversations
            .find_for_client(workspace_id, client.id, channel)
            .await?
        {
            Some(conversation) => (conversation, false),
            None => {
                let conversation = Conversation {
                    id: Uuid::new_v4(),
                    workspace_id,
                    client_id: client.id,
                    channel,
                    provider_handle: address.as_str().to_string(),
                    status: ConversationStatus::Open,
                    last_message_at: None,
                };
                self.conversations.insert(&conversation).await?;
                (conversation, true)
            }
        };

        Ok(Resolution {
            client,
            conversation,
            client_was_created,
            conversation_was_created,
        })
    }
}
