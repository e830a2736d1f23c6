use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::services::{
    job_queue::{EnqueueOptions, JobQueue},
    notifier::RealtimeNotifier,
    resolver::{ContactResolver, LeadHook},
};
use crate::domain::{
    events::{CampaignKickoffJob, ContactDispatchJob, Job},
    models::{
        Campaign, CampaignContact, CampaignStatus, ContactStatus, Message, MessageMeta,
        MessageStatus, SenderKind,
    },
    repositories::{CampaignContactRepository, CampaignRepository, MessageRepository},
    scheduling::next_valid_send_time,
    value_objects::{NormalizedAddress, render_template},
};

/// Consumes one campaign-kickoff job and turns the campaign's pending
/// contact list into a paced schedule of delayed dispatch jobs.
///
/// The pacing cursor is handler-local; correctness relies on the campaign's
/// single Pending -> Running transition being consumed at most once, not on
/// mutual exclusion.
pub struct CampaignDispatchHandler {
    campaigns: Arc<dyn CampaignRepository>,
    contacts: Arc<dyn CampaignContactRepository>,
    messages: Arc<dyn MessageRepository>,
    resolver: Arc<dyn ContactResolver>,
    leads: Arc<dyn LeadHook>,
    notifier: Arc<dyn RealtimeNotifier>,
    queue: Arc<dyn JobQueue>,
}

impl CampaignDispatchHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        contacts: Arc<dyn CampaignContactRepository>,
        messages: Arc<dyn MessageRepository>,
        resolver: Arc<dyn ContactResolver>,
        leads: Arc<dyn LeadHook>,
        notifier: Arc<dyn RealtimeNotifier>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            campaigns,
            contacts,
            messages,
            resolver,
            leads,
            notifier,
            queue,
        }
    }

    pub async fn handle(&self, job: CampaignKickoffJob) -> anyhow::Result<()> {
        self.run(job, Utc::now()).await
    }

    pub async fn run(&self, job: CampaignKickoffJob, now: DateTime<Utc>) -> anyhow::Result<()> {
        let Some(campaign) = self.campaigns.get(job.campaign_id).await? else {
            warn!(campaign_id = %job.campaign_id, "kickoff for unknown campaign, dropping");
            return Ok(());
        };
        // Duplicate kickoff delivery lands here after the first run flipped
        // the status away from Pending.
        if campaign.status != CampaignStatus::Pending {
            debug!(campaign_id = %campaign.id, status = ?campaign.status, "campaign already picked up, dropping kickoff");
            return Ok(());
        }

        let pending = self.contacts.list_pending(campaign.id).await?;
        if pending.is_empty() {
            self.campaigns
                .set_status(campaign.id, CampaignStatus::Completed)
                .await?;
            return Ok(());
        }
        self.campaigns
            .set_status(campaign.id, CampaignStatus::Running)
            .await?;

        let mut cursor = now;
        for (index, contact) in pending.iter().enumerate() {
            let address = match NormalizedAddress::parse(&contact.address) {
                Ok(address) => address,
                Err(err) => {
                    // Invalid destination: fail the contact without
                    // consuming a pacing slot.
                    self.contacts
                        .set_status(contact.id, ContactStatus::Failed, Some(&err.to_string()))
                        .await?;
                    continue;
                }
            };

            let interval = if index == 0 {
                TimeDelta::zero()
            } else {
                TimeDelta::seconds(i64::from(campaign.send_interval_seconds))
            };
            let send_at = next_valid_send_time(cursor, interval, &campaign.window);

            self.schedule_contact(&campaign, contact, &address, send_at, now)
                .await?;

            // A failed contact past address validation still consumes its
            // pacing slot.
            cursor = send_at;
        }

        // Every contact may have failed planning; without this check no
        // dispatch job would ever run the terminal transition.
        if self.contacts.count_open(campaign.id).await? == 0 {
            self.campaigns
                .set_status(campaign.id, CampaignStatus::Completed)
                .await?;
        }
        Ok(())
    }

    /// Resolve, render, persist and enqueue one contact. Per-contact
    /// failures are absorbed into the contact's status; only store failures
    /// escape as errors.
    async fn schedule_contact(
        &self,
        campaign: &Campaign,
        contact: &CampaignContact,
        address: &NormalizedAddress,
        send_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let resolution = match self
            .resolver
            .resolve(
                campaign.workspace_id,
                campaign.channel,
                address,
                contact.display_name.as_deref(),
            )
            .await
        {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(contact_id = %contact.id, error = %err, "contact resolution failed");
                self.contacts
                    .set_status(
                        contact.id,
                        ContactStatus::Failed,
                        Some(&format!("resolver: {err}")),
                    )
                    .await?;
                return Ok(());
            }
        };

        if resolution.client_was_created {
            if let Err(err) = self
                .leads
                .client_created(campaign.workspace_id, &resolution.client)
                .await
            {
                warn!(client_id = %resolution.client.id, error = %err, "lead hook failed");
            }
        }

        let mut variables = contact.variables.clone();
        if let Some(name) = &contact.display_name {
            variables
                .entry("name".to_string())
                .or_insert_with(|| name.clone());
        }
        let content = render_template(&campaign.body, &variables);

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: resolution.conversation.id,
            sender: SenderKind::Operator,
            content,
            status: MessageStatus::Pending,
            send_at,
            created_at: now,
            meta: MessageMeta {
                campaign_id: Some(campaign.id),
                contact_id: Some(contact.id),
                rule_id: None,
            },
        };
        self.messages.insert(&message).await?;

        if let Err(err) = self
            .notifier
            .publish(
                campaign.workspace_id,
                "message.pending",
                serde_json::json!({
                    "message_id": message.id,
                    "conversation_id": message.conversation_id,
                    "send_at": send_at,
                }),
            )
            .await
        {
            debug!(message_id = %message.id, error = %err, "realtime notify failed");
        }

        let delay = (send_at - now).to_std().unwrap_or(Duration::ZERO);
        let job = Job::ContactDispatch(ContactDispatchJob {
            contact_id: contact.id,
            campaign_id: campaign.id,
            workspace_id: campaign.workspace_id,
            message_id: message.id,
            send_at,
        });
        match self
            .queue
            .enqueue(job, EnqueueOptions::delayed(delay, contact.id.to_string()))
            .await
        {
            Ok(()) => {
                self.contacts
                    .set_status(contact.id, ContactStatus::Scheduled, None)
                    .await?;
            }
            Err(err) => {
                warn!(contact_id = %contact.id, error = %err, "enqueue of dispatch job failed");
                self.contacts
                    .set_status(
                        contact.id,
                        ContactStatus::Failed,
                        Some(&format!("enqueue: {err}")),
                    )
                    .await?;
                self.messages
                    .set_status(message.id, MessageStatus::Failed)
                    .await?;
            }
        }
        Ok(())
    }
}
