use std::sync::Arc;

use uuid::Uuid;

use crate::application::services::job_queue::{EnqueueOptions, JobQueue};
use crate::domain::{
    errors::DomainError,
    events::{CampaignKickoffJob, Job},
    models::CampaignStatus,
    repositories::CampaignRepository,
};

pub struct StartCampaignUseCase {
    campaigns: Arc<dyn CampaignRepository>,
    queue: Arc<dyn JobQueue>,
}

pub struct StartCampaignRequest {
    pub campaign_id: Uuid,
    pub workspace_id: Uuid,
}

impl StartCampaignUseCase {
    pub fn new(campaigns: Arc<dyn CampaignRepository>, queue: Arc<dyn JobQueue>) -> Self {
        Self { campaigns, queue }
    }

    pub async fn execute(&self, request: StartCampaignRequest) -> anyhow::Result<()> {
        let campaign = self
            .campaigns
            .get(request.campaign_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("campaign {}", request.campaign_id)))?;

        if campaign.workspace_id != request.workspace_id {
            return Err(DomainError::Forbidden("campaign belongs to another workspace".into()).into());
        }
        if campaign.status != CampaignStatus::Pending {
            return Err(DomainError::Validation(format!(
                "campaign {} is not pending",
                campaign.id
            ))
            .into());
        }

        // The kickoff itself re-checks the Pending status, so a duplicate
        // enqueue past the dedupe window is still harmless.
        self.queue
            .enqueue(
                Job::CampaignKickoff(CampaignKickoffJob {
                    campaign_id: campaign.id,
                    workspace_id: campaign.workspace_id,
                }),
                EnqueueOptions::immediate(campaign.id.to_string()),
            )
            .await?;
        Ok(())
    }
}
