pub mod campaign_dispatcher;
pub mod contact_dispatch;
pub mod sequence_step;

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::events::Job;

pub use campaign_dispatcher::CampaignDispatchHandler;
pub use contact_dispatch::ContactDispatchHandler;
pub use sequence_step::SequenceStepHandler;

/// One consumed job, processed to completion.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: Job) -> anyhow::Result<()>;
}

/// Routes a decoded job to its handler. The queue workers are generic over
/// `JobHandler`; this is the only place that knows all three.
pub struct JobRouter {
    kickoff: Arc<CampaignDispatchHandler>,
    dispatch: Arc<ContactDispatchHandler>,
    step: Arc<SequenceStepHandler>,
}

impl JobRouter {
    pub fn new(
        kickoff: Arc<CampaignDispatchHandler>,
        dispatch: Arc<ContactDispatchHandler>,
        step: Arc<SequenceStepHandler>,
    ) -> Self {
        Self {
            kickoff,
            dispatch,
            step,
        }
    }
}

#[async_trait]
impl JobHandler for JobRouter {
    async fn handle(&self, job: Job) -> anyhow::Result<()> {
        match job {
            Job::CampaignKickoff(job) => self.kickoff.handle(job).await,
            Job::ContactDispatch(job) => self.dispatch.handle(job).await,
            Job::SequenceStep(job) => self.step.handle(job).await,
        }
    }
}
