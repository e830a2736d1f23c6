use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timed step of a workspace's drip sequence. There is no stored
/// successor pointer: the workspace's rules ordered by `created_at`
/// ascending define the topology, and "next" is positional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRule {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub delay_ms: i64,
    pub template: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpStatus {
    Active,
    Paused,
    Completed,
    Failed,
    Converted,
    Cancelled,
}

/// A per-client drip instance tracking progress through the rule list.
/// At most one Active follow-up per (client, workspace); enforced by a
/// check-then-create at initiation, so callers treat it as best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub client_id: Uuid,
    pub conversation_id: Uuid,
    pub status: FollowUpStatus,
    pub current_step_order: i32,
    pub next_message_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
