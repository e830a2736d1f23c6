use async_trait::async_trait;
use uuid::Uuid;

/// Fire-and-forget realtime fan-out to a workspace channel. No delivery
/// guarantee; callers log failures and move on.
#[async_trait]
pub trait RealtimeNotifier: Send + Sync {
    async fn publish(
        &self,
        workspace_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<()>;
}
