use std::sync::Arc;

use poem_openapi::Tags;

use crate::application::usecases::{
    cancel_follow_up::CancelFollowUpUseCase, pause_follow_up::PauseFollowUpUseCase,
    start_campaign::StartCampaignUseCase, start_follow_up::StartFollowUpUseCase,
};

#[derive(Clone)]
pub struct ApiState {
    pub start_campaign_usecase: Arc<StartCampaignUseCase>,
    pub start_follow_up_usecase: Arc<StartFollowUpUseCase>,
    pub pause_follow_up_usecase: Arc<PauseFollowUpUseCase>,
    pub cancel_follow_up_usecase: Arc<CancelFollowUpUseCase>,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Campaigns,
    FollowUps,
}
