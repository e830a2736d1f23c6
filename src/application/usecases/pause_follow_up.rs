use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::FollowUpStatus,
    repositories::FollowUpRepository,
};

/// Advisory pause: a step job already dequeued still executes its send,
/// but the Active check stops any further scheduling.
pub struct PauseFollowUpUseCase {
    follow_ups: Arc<dyn FollowUpRepository>,
}

pub struct PauseFollowUpRequest {
    pub follow_up_id: Uuid,
    pub workspace_id: Uuid,
}

impl PauseFollowUpUseCase {
    pub fn new(follow_ups: Arc<dyn FollowUpRepository>) -> Self {
        Self { follow_ups }
    }

    pub async fn execute(&self, request: PauseFollowUpRequest) -> anyhow::Result<()> {
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
        if follow_up.status != FollowUpStatus::Active {
            return Err(DomainError::Validation(format!(
                "follow-up {} is not active",
                follow_up.id
            ))
            .into());
        }
        self.follow_ups
            .set_status(follow_up.id, FollowUpStatus::Paused)
            .await?;
        Ok(())
    }
}
