use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, payload::Json};
use uuid::Uuid;

use crate::{
    application::usecases::start_campaign::StartCampaignRequest,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        error::map_domain_error,
        requests::StartCampaignRequestDto,
        responses::AcceptedDto,
    },
};

#[derive(Clone)]
pub struct CampaignEndpoints {
    state: Arc<ApiState>,
}

impl CampaignEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl CampaignEndpoints {
    #[oai(
        path = "/campaigns/:campaign_id/actions/start",
        method = "post",
        tag = EndpointsTags::Campaigns,
    )]
    pub async fn start_campaign(
        &self,
        campaign_id: Path<Uuid>,
        request: Json<StartCampaignRequestDto>,
    ) -> PoemResult<Json<AcceptedDto>> {
        self.state
            .start_campaign_usecase
            .execute(StartCampaignRequest {
                campaign_id: campaign_id.0,
                workspace_id: request.workspace_id,
            })
            .await
            .map_err(map_domain_error)?;

        Ok(Json(AcceptedDto { accepted: true }))
    }
}
