use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    WhatsApp,
    Telegram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialsStatus {
    Active,
    Inactive,
}

/// Provider credentials a workspace sends with. At most one Active row per
/// (workspace, channel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendingCredentials {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub channel: ChannelType,
    pub access_token: String,
    pub api_url: Option<String>,
    pub status: CredentialsStatus,
    pub updated_at: DateTime<Utc>,
}
