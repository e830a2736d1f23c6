use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::application::services::{notifier::RealtimeNotifier, resolver::LeadHook};
use crate::domain::models::Client as DomainClient;

/// Pushes workspace events to an external realtime relay over HTTP. The
/// relay fans out to connected UI sessions; no delivery guarantee.
pub struct HttpNotifier {
    http: Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: String, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("outreach/realtime")
                .timeout(timeout)
                .build()
                .expect("failed to build realtime client"),
            endpoint,
        })
    }
}

#[async_trait]
impl RealtimeNotifier for HttpNotifier {
    async fn publish(
        &self,
        workspace_id: Uuid,
        event: &str,
        payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "channel": format!("workspace:{workspace_id}"),
                "event": event,
                "payload": payload,
            }))
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Swallows events. Used when no relay is configured.
pub struct NoopNotifier;

#[async_trait]
impl RealtimeNotifier for NoopNotifier {
    async fn publish(
        &self,
        _workspace_id: Uuid,
        _event: &str,
        _payload: serde_json::Value,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Posts freshly-created clients to the lead-intake webhook, which runs the
/// "new lead" workflow (lead record, pipeline placement) outside this
/// service.
pub struct LeadWebhook {
    http: Client,
    endpoint: String,
}

impl LeadWebhook {
    pub fn new(endpoint: String, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("outreach/leads")
                .timeout(timeout)
                .build()
                .expect("failed to build lead webhook client"),
            endpoint,
        })
    }
}

#[async_trait]
impl LeadHook for LeadWebhook {
    async fn client_created(
        &self,
        workspace_id: Uuid,
        client: &DomainClient,
    ) -> anyhow::Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "workspace_id": workspace_id,
                "client_id": client.id,
                "address": client.address,
                "display_name": client.display_name,
            }))
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Used when no lead-intake webhook is configured.
pub struct NoopLeadHook;

#[async_trait]
impl LeadHook for NoopLeadHook {
    async fn client_created(
        &self,
        _workspace_id: Uuid,
        _client: &DomainClient,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}
