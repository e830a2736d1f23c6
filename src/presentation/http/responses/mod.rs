use poem_openapi::Object;
use uuid::Uuid;

#[derive(Object)]
pub struct AcceptedDto {
    pub accepted: bool,
}

#[derive(Object)]
pub struct StartFollowUpResponseDto {
    pub follow_up_id: Uuid,
}
