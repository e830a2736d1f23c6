use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::models::{ChannelType, Client, Conversation};
use crate::domain::value_objects::NormalizedAddress;

#[derive(Debug, Clone)]
pub struct Resolution {
    pub client: Client,
    pub conversation: Conversation,
    pub client_was_created: bool,
    pub conversation_was_created: bool,
}

/// Idempotently maps a destination address to a client and conversation:
/// repeated calls with the same address return the same records.
#[async_trait]
pub trait ContactResolver: Send + Sync {
    async fn resolve(
        &self,
        workspace_id: Uuid,
        channel: ChannelType,
        address: &NormalizedAddress,
        display_name: Option<&str>,
    ) -> anyhow::Result<Resolution>;
}

/// Invoked when the resolver created a brand-new client. Fire-and-forget;
/// failures are logged by the caller and never abort dispatch.
#[async_trait]
pub trait LeadHook: Send + Sync {
    async fn client_created(&self, workspace_id: Uuid, client: &Client) -> anyhow::Result<()>;
}
