use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::application::services::{
    notifier::RealtimeNotifier,
    sender::{ProviderReceipt, SenderGateway},
};
use crate::domain::{
    events::ContactDispatchJob,
    models::{Campaign, CampaignStatus, ContactStatus, Message, MessageStatus},
    repositories::{
        CampaignContactRepository, CampaignRepository, ConversationRepository,
        CredentialsRepository, MessageRepository,
    },
};

/// Consumes one delayed per-contact dispatch job: performs the provider
/// send, finalizes contact and message state, and flips the campaign to
/// Completed once no open contacts remain.
///
/// Jobs are mutually independent and safe to run in parallel, including
/// across campaigns; ordering was fixed at planning time through each job's
/// delay, not through execution order.
pub struct ContactDispatchHandler {
    campaigns: Arc<dyn CampaignRepository>,
    contacts: Arc<dyn CampaignContactRepository>,
    messages: Arc<dyn MessageRepository>,
    conversations: Arc<dyn ConversationRepository>,
    credentials: Arc<dyn CredentialsRepository>,
    gateway: SenderGateway,
    notifier: Arc<dyn RealtimeNotifier>,
}

impl ContactDispatchHandler {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        contacts: Arc<dyn CampaignContactRepository>,
        messages: Arc<dyn MessageRepository>,
        conversations: Arc<dyn ConversationRepository>,
        credentials: Arc<dyn CredentialsRepository>,
        gateway: SenderGateway,
        notifier: Arc<dyn RealtimeNotifier>,
    ) -> Self {
        Self {
            campaigns,
            contacts,
            messages,
            conversations,
            credentials,
            gateway,
            notifier,
        }
    }

    pub async fn handle(&self, job: ContactDispatchJob) -> anyhow::Result<()> {
        self.run(job, Utc::now()).await
    }

    pub async fn run(&self, job: ContactDispatchJob, now: DateTime<Utc>) -> anyhow::Result<()> {
        let Some(contact) = self.contacts.get(job.contact_id).await? else {
            debug!(contact_id = %job.contact_id, "contact gone, dropping dispatch");
            return Ok(());
        };
        // Redelivered or stale job: only Scheduled contacts are sendable.
        if contact.status != ContactStatus::Scheduled {
            debug!(contact_id = %contact.id, status = ?contact.status, "contact not scheduled, dropping dispatch");
            return Ok(());
        }
        let Some(campaign) = self.campaigns.get(job.campaign_id).await? else {
            warn!(campaign_id = %job.campaign_id, "campaign gone, dropping dispatch");
            return Ok(());
        };
        if campaign.status != CampaignStatus::Running {
            debug!(campaign_id = %campaign.id, status = ?campaign.status, "campaign not running, dropping dispatch");
            return Ok(());
        }
        let Some(message) = self.messages.get(job.message_id).await? else {
            return Err(anyhow!(
                "message {} missing for contact {}",
                job.message_id,
                job.contact_id
            ));
        };

        match self.deliver(&campaign, &message).await {
            Ok(_receipt) => {
                self.messages
                    .set_status(message.id, MessageStatus::Sent)
                    .await?;
                self.contacts
                    .set_status(contact.id, ContactStatus::Sent, None)
                    .await?;
                self.conversations
                    .touch_last_message(message.conversation_id, now)
                    .await?;
                if let Err(err) = self
                    .notifier
                    .publish(
                        campaign.workspace_id,
                        "message.sent",
                        serde_json::json!({
                            "message_id": message.id,
                            "conversation_id": message.conversation_id,
                        }),
                    )
                    .await
                {
                    debug!(message_id = %message.id, error = %err, "realtime notify failed");
                }
            }
            Err(err) => {
                // Per-contact delivery failure: mark and move on, the
                // campaign keeps going.
                warn!(contact_id = %contact.id, error = %err, "contact delivery failed");
                self.messages
                    .set_status(message.id, MessageStatus::Failed)
                    .await?;
                self.contacts
                    .set_status(contact.id, ContactStatus::Failed, Some(&err.to_string()))
                    .await?;
            }
        }

        // "Last contact processed" event: the dispatcher only completes the
        // empty-batch case, the terminal transition for a populated campaign
        // happens here.
        if self.contacts.count_open(job.campaign_id).await? == 0 {
            self.campaigns
                .set_status(job.campaign_id, CampaignStatus::Completed)
                .await?;
        }
        Ok(())
    }

    async fn deliver(
        &self,
        campaign: &Campaign,
        message: &Message,
    ) -> anyhow::Result<ProviderReceipt> {
        let credentials = self
            .credentials
            .find_active(campaign.workspace_id, campaign.channel)
            .await?
            .ok_or_else(|| {
                anyhow!(
                    "no active sending credentials for workspace {} on {:?}",
                    campaign.workspace_id,
                    campaign.channel
                )
            })?;
        let conversation = self
            .conversations
            .get(message.conversation_id)
            .await?
            .ok_or_else(|| anyhow!("conversation {} not found", message.conversation_id))?;
        let sender = self
            .gateway
            .get(campaign.channel)
            .ok_or_else(|| anyhow!("no sender registered for channel {:?}", campaign.channel))?;
        sender
            .send(&credentials, &conversation.provider_handle, &message.content)
            .await
    }
}
