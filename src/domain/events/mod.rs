use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kicks off planning for one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignKickoffJob {
    pub campaign_id: Uuid,
    pub workspace_id: Uuid,
}

/// One delayed "send this one message at this one time" unit produced by
/// the campaign dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDispatchJob {
    pub contact_id: Uuid,
    pub campaign_id: Uuid,
    pub workspace_id: Uuid,
    pub message_id: Uuid,
    pub send_at: DateTime<Utc>,
}

/// One step of a follow-up sequence, enqueued with the rule's delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStepJob {
    pub follow_up_id: Uuid,
    pub rule_id: Uuid,
    pub workspace_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    CampaignKickoff(CampaignKickoffJob),
    ContactDispatch(ContactDispatchJob),
    SequenceStep(SequenceStepJob),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    CampaignKickoff,
    ContactDispatch,
    SequenceStep,
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::CampaignKickoff(_) => JobKind::CampaignKickoff,
            Job::ContactDispatch(_) => JobKind::ContactDispatch,
            Job::SequenceStep(_) => JobKind::SequenceStep,
        }
    }
}

impl JobKind {
    /// Subject suffix under the queue's stream.
    pub fn subject(self) -> &'static str {
        match self {
            JobKind::CampaignKickoff => "campaign_kickoff",
            JobKind::ContactDispatch => "contact_dispatch",
            JobKind::SequenceStep => "sequence_step",
        }
    }
}
