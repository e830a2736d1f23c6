use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::services::{
    job_queue::{EnqueueOptions, JobQueue},
    sender::SenderGateway,
};
use crate::domain::{
    events::{Job, SequenceStepJob},
    models::{FollowUp, FollowUpStatus, Message, MessageMeta, MessageStatus, SenderKind},
    repositories::{
        ClientRepository, ConversationRepository, CredentialsRepository, FollowUpRepository,
        MessageRepository, SequenceRuleRepository,
    },
    value_objects::render_template,
};

/// Consumes one send-sequence-step job: sends the rule's message and either
/// schedules the positionally-next rule or completes the follow-up.
///
/// Steps of one follow-up are causally chained: step N+1 is enqueued only
/// from inside the successful handling of step N. The Active-status check at
/// entry is the sole idempotency guard against queue redelivery; a race with
/// a concurrent pause/cancel resolves as last-write-wins on the status.
pub struct SequenceStepHandler {
    follow_ups: Arc<dyn FollowUpRepository>,
    rules: Arc<dyn SequenceRuleRepository>,
    clients: Arc<dyn ClientRepository>,
    conversations: Arc<dyn ConversationRepository>,
    credentials: Arc<dyn CredentialsRepository>,
    messages: Arc<dyn MessageRepository>,
    gateway: SenderGateway,
    queue: Arc<dyn JobQueue>,
}

impl SequenceStepHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        follow_ups: Arc<dyn FollowUpRepository>,
        rules: Arc<dyn SequenceRuleRepository>,
        clients: Arc<dyn ClientRepository>,
        conversations: Arc<dyn ConversationRepository>,
        credentials: Arc<dyn CredentialsRepository>,
        messages: Arc<dyn MessageRepository>,
        gateway: SenderGateway,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            follow_ups,
            rules,
            clients,
            conversations,
            credentials,
            messages,
            gateway,
            queue,
        }
    }

    pub async fn handle(&self, job: SequenceStepJob) -> anyhow::Result<()> {
        self.run(job, Utc::now()).await
    }

    pub async fn run(&self, job: SequenceStepJob, now: DateTime<Utc>) -> anyhow::Result<()> {
        let Some(follow_up) = self.follow_ups.get(job.follow_up_id).await? else {
            debug!(follow_up_id = %job.follow_up_id, "follow-up gone, dropping step");
            return Ok(());
        };
        // Stale or duplicate delivery, or the user paused/cancelled in the
        // meantime.
        if follow_up.status != FollowUpStatus::Active {
            debug!(follow_up_id = %follow_up.id, status = ?follow_up.status, "follow-up not active, dropping step");
            return Ok(());
        }

        match self.process(&follow_up, &job, now).await {
            Ok(()) => Ok(()),
            Err(err) => {
                // Best-effort Failed marking, then hand the original error
                // back to the queue so its retry policy governs redelivery.
                if let Err(mark_err) = self
                    .follow_ups
                    .set_status(follow_up.id, FollowUpStatus::Failed)
                    .await
                {
                    error!(follow_up_id = %follow_up.id, error = %mark_err, "could not mark follow-up failed");
                }
                Err(err)
            }
        }
    }

    async fn process(
        &self,
        follow_up: &FollowUp,
        job: &SequenceStepJob,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let rules = self.rules.list_for_workspace(job.workspace_id).await?;
        let index = rules
            .iter()
            .position(|rule| rule.id == job.rule_id)
            .ok_or_else(|| {
                anyhow!(
                    "sequence rule {} not found in workspace {}",
                    job.rule_id,
                    job.workspace_id
                )
            })?;
        let rule = &rules[index];

        // Missing client, conversation or credentials drops the step: the
        // follow-up is left unchanged and nothing is retried.
        let Some(client) = self.clients.get(follow_up.client_id).await? else {
            warn!(follow_up_id = %follow_up.id, client_id = %follow_up.client_id, "client missing, dropping step");
            return Ok(());
        };
        let Some(conversation) = self
            .conversations
            .find_open_for_client(follow_up.workspace_id, follow_up.client_id)
            .await?
        else {
            warn!(follow_up_id = %follow_up.id, "no open conversation, dropping step");
            return Ok(());
        };
        let Some(credentials) = self
            .credentials
            .find_active(follow_up.workspace_id, conversation.channel)
            .await?
        else {
            warn!(follow_up_id = %follow_up.id, "no active sending credentials, dropping step");
            return Ok(());
        };

        let mut variables = HashMap::new();
        if let Some(name) = &client.display_name {
            variables.insert("name".to_string(), name.clone());
        }
        variables.insert("address".to_string(), client.address.clone());
        let content = render_template(&rule.template, &variables);

        let sender = self
            .gateway
            .get(conversation.channel)
            .ok_or_else(|| anyhow!("no sender registered for channel {:?}", conversation.channel))?;
        sender
            .send(&credentials, &conversation.provider_handle, &content)
            .await?;

        // Successor is positional: the rule after this one in the ordered
        // list, no stored pointer.
        match rules.get(index + 1) {
            Some(next_rule) if next_rule.delay_ms >= 0 => {
                let delay = Duration::from_millis(next_rule.delay_ms as u64);
                self.queue
                    .enqueue(
                        Job::SequenceStep(SequenceStepJob {
                            follow_up_id: follow_up.id,
                            rule_id: next_rule.id,
                            workspace_id: job.workspace_id,
                        }),
                        EnqueueOptions::delayed(
                            delay,
                            format!("{}:{}", follow_up.id, next_rule.id),
                        ),
                    )
                    .await?;
                self.follow_ups
                    .advance(
                        follow_up.id,
                        index as i32,
                        now + TimeDelta::milliseconds(next_rule.delay_ms),
                    )
                    .await?;
            }
            _ => {
                self.follow_ups
                    .complete(follow_up.id, index as i32, now)
                    .await?;
            }
        }

        let audit = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            sender: SenderKind::Automated,
            content,
            status: MessageStatus::Sent,
            send_at: now,
            created_at: now,
            meta: MessageMeta {
                rule_id: Some(rule.id),
                ..MessageMeta::default()
            },
        };
        self.messages.insert(&audit).await?;
        self.conversations
            .touch_last_message(conversation.id, now)
            .await?;
        Ok(())
    }
}
