use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::FollowUpStatus,
    repositories::FollowUpRepository,
};

pub struct CancelFollowUpUseCase {
    follow_ups: Arc<dyn FollowUpRepository>,
}

pub struct CancelFollowUpRequest {
    pub follow_up_id: Uuid,
    pub workspace_id: Uuid,
}

impl CancelFollowUpUseCase {
    pub fn new(follow_ups: Arc<dyn FollowUpRepository>) -> Self {
        Self { follow_ups }
    }

    pub async fn execute(&self, request: CancelFollowUpRequest) -> anyhow::Result<()> {
        let follow_up = self
            .follow_ups
            .get(request.follow_up_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("follow-up {}", request.follow_up_id)))?;
        if follow_up.workspace_id != request.workspace_id {
            return Err(
                DomainError::Forbidden("follow-up belongs to another workspace".into()).into(),
            );
        }
        if !matches!(
            follow_up.status,
            FollowUpStatus::Active | FollowUpStatus::Paused
        ) {
            return Err(DomainError::Validation(format!(
                "follow-up {} already terminal",
                follow_up.id
            ))
            .into());
        }
        self.follow_ups
            .set_status(follow_up.id, FollowUpStatus::Cancelled)
            .await?;
        Ok(())
    }
}
