use poem_openapi::Object;
use uuid::Uuid;

#[derive(Object, Debug)]
pub struct StartCampaignRequestDto {
    pub workspace_id: Uuid,
}

#[derive(Object, Debug)]
pub struct StartFollowUpRequestDto {
    pub workspace_id: Uuid,
    pub client_id: Uuid,
}

#[derive(Object, Debug)]
pub struct FollowUpActionRequestDto {
    pub workspace_id: Uuid,
}
