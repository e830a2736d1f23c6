use std::sync::Arc;

use poem::Result as PoemResult;
use poem_openapi::{OpenApi, param::Path, payload::Json};
use uuid::Uuid;

use crate::{
    application::usecases::{
        cancel_follow_up::CancelFollowUpRequest, pause_follow_up::PauseFollowUpRequest,
        start_follow_up::StartFollowUpRequest,
    },
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        error::map_domain_error,
        requests::{FollowUpActionRequestDto, StartFollowUpRequestDto},
        responses::{AcceptedDto, StartFollowUpResponseDto},
    },
};

#[derive(Clone)]
pub struct FollowUpEndpoints {
    state: Arc<ApiState>,
}

impl FollowUpEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl FollowUpEndpoints {
    #[oai(path = "/follow-ups", method = "post", tag = EndpointsTags::FollowUps)]
    pub async fn start_follow_up(
        &self,
        request: Json<StartFollowUpRequestDto>,
    ) -> PoemResult<Json<StartFollowUpResponseDto>> {
        let response = self
            .state
            .start_follow_up_usecase
            .execute(StartFollowUpRequest {
                workspace_id: request.workspace_id,
                client_id: request.client_id,
            })
            .await
            .map_err(map_domain_error)?;

        Ok(Json(StartFollowUpResponseDto {
            follow_up_id: response.follow_up_id,
        }))
    }

    #[oai(
        path = "/follow-ups/:follow_up_id/actions/pause",
        method = "post",
        tag = EndpointsTags::FollowUps,
    )]
    pub async fn pause_follow_up(
        &self,
        follow_up_id: Path<Uuid>,
        request: Json<FollowUpActionRequestDto>,
    ) -> PoemResult<Json<AcceptedDto>> {
        self.state
            .pause_follow_up_usecase
            .execute(PauseFollowUpRequest {
                follow_up_id: follow_up_id.0,
                workspace_id: request.workspace_id,
            })
            .await
            .map_err(map_domain_error)?;

        Ok(Json(AcceptedDto { accepted: true }))
    }

    #[oai(
        path = "/follow-ups/:follow_up_id/actions/cancel",
        method = "post",
        tag = EndpointsTags::FollowUps,
    )]
    pub async fn cancel_follow_up(
        &self,
        follow_up_id: Path<Uuid>,
        request: Json<FollowUpActionRequestDto>,
    ) -> PoemResult<Json<AcceptedDto>> {
        self.state
            .cancel_follow_up_usecase
            .execute(CancelFollowUpRequest {
                follow_up_id: follow_up_id.0,
                workspace_id: request.workspace_id,
            })
            .await
            .map_err(map_domain_error)?;

        Ok(Json(AcceptedDto { accepted: true }))
    }
}
