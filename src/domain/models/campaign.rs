use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::channel::ChannelType;
use crate::domain::scheduling::SendWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

/// One batch outbound-messaging job: a template, a recipient list and the
/// pacing rules the dispatcher schedules under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub channel: ChannelType,
    pub body: String,
    pub status: CampaignStatus,
    pub send_interval_seconds: u32,
    pub window: SendWindow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactStatus {
    Pending,
    Scheduled,
    Failed,
    Sent,
}

/// One recipient within a campaign, with its per-recipient delivery state
/// and `{{key}}` substitution variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignContact {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub address: String,
    pub display_name: Option<String>,
    pub variables: HashMap<String, String>,
    pub status: ContactStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContactStatus {
    /// Terminal states no dispatch job will touch again.
    pub fn is_terminal(self) -> bool {
        matches!(self, ContactStatus::Failed | ContactStatus::Sent)
    }
}
