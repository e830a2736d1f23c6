use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use crate::application::services::job_queue::{EnqueueOptions, JobQueue};
use crate::domain::{
    errors::DomainError,
    events::{Job, SequenceStepJob},
    models::{FollowUp, FollowUpStatus},
    repositories::{ConversationRepository, FollowUpRepository, SequenceRuleRepository},
};

pub struct StartFollowUpUseCase {
    follow_ups: Arc<dyn FollowUpRepository>,
    rules: Arc<dyn SequenceRuleRepository>,
    conversations: Arc<dyn ConversationRepository>,
    queue: Arc<dyn JobQueue>,
}

pub struct StartFollowUpRequest {
    pub workspace_id: Uuid,
    pub client_id: Uuid,
}

#[derive(Debug)]
pub struct StartFollowUpResponse {
    pub follow_up_id: Uuid,
}

impl StartFollowUpUseCase {
    pub fn new(
        follow_ups: Arc<dyn FollowUpRepository>,
        rules: Arc<dyn SequenceRuleRepository>,
        conversations: Arc<dyn ConversationRepository>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            follow_ups,
            rules,
            conversations,
            queue,
        }
    }

    pub async fn execute(
        &self,
        request: StartFollowUpRequest,
    ) -> anyhow::Result<StartFollowUpResponse> {
        // Best-effort uniqueness: check-then-create, no database constraint
        // backs this up.
        if self
            .follow_ups
            .find_active(request.workspace_id, request.client_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyExists(format!(
                "active follow-up for client {}",
                request.client_id
            ))
            .into());
        }

        let rules = self.rules.list_for_workspace(request.workspace_id).await?;
        let Some(first_rule) = rules.first() else {
            return Err(
                DomainError::Validation("workspace has no sequence rules".to_string()).into(),
            );
        };

        let conversation = self
            .conversations
            .find_open_for_client(request.workspace_id, request.client_id)
            .await?
            .ok_or_else(|| {
                DomainError::Validation(format!(
                    "client {} has no open conversation",
                    request.client_id
                ))
            })?;

        let now = Utc::now();
        let delay_ms = first_rule.delay_ms.max(0);
        let follow_up = FollowUp {
            id: Uuid::new_v4(),
            workspace_id: request.workspace_id,
            client_id: request.client_id,
            conversation_id: conversation.id,
            status: FollowUpStatus::Active,
            current_step_order: 0,
            next_message_at: Some(now + TimeDelta::milliseconds(delay_ms)),
            started_at: now,
            completed_at: None,
        };
        self.follow_ups.insert(&follow_up).await?;

        self.queue
            .enqueue(
                Job::SequenceStep(SequenceStepJob {
                    follow_up_id: follow_up.id,
                    rule_id: first_rule.id,
                    workspace_id: request.workspace_id,
                }),
                EnqueueOptions::delayed(
                    std::time::Duration::from_millis(delay_ms as u64),
                    format!("{}:{}", follow_up.id, first_rule.id),
                ),
            )
            .await?;

        Ok(StartFollowUpResponse {
            follow_up_id: follow_up.id,
        })
    }
}
