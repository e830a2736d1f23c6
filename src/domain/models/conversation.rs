use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::ChannelType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationStatus {
    Open,
    Closed,
}

/// A provider-side conversation. Unique per (workspace, client, channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub client_id: Uuid,
    pub channel: ChannelType,
    pub provider_handle: String,
    pub status: ConversationStatus,
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub address: String,
    pub display_name: Option<String>,
    pub channel: ChannelType,
    pub created_at: DateTime<Utc>,
}
