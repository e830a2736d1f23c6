use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::services::sender::{ChannelSender, ProviderReceipt};
use crate::domain::models::{ChannelType, SendingCredentials};

/// WhatsApp Business API sender. The workspace credentials carry the access
/// token and optionally a per-workspace API base URL.
pub struct WhatsAppSender {
    http: Client,
    base_url: String,
}

impl WhatsAppSender {
    pub fn new(base_url: String, timeout: Duration) -> Arc<dyn ChannelSender> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("outreach/whatsapp")
                .timeout(timeout)
                .build()
                .expect("failed to build whatsapp client"),
            base_url,
        }) as Arc<dyn ChannelSender>
    }
}

#[async_trait]
impl ChannelSender for WhatsAppSender {
    fn channel(&self) -> ChannelType {
        ChannelType::WhatsApp
    }

    async fn send(
        &self,
        credentials: &SendingCredentials,
        destination: &str,
        body: &str,
    ) -> anyhow::Result<ProviderReceipt> {
        let base = credentials.api_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{base}/v1/messages");
        let response = self
            .http
            .post(url)
            .bearer_auth(&credentials.access_token)
            .json(&serde_json::json!({
                "to": destination,
                "type": "text",
                "text": { "body": body },
            }))
            .send()
            .await?;

        let status = response.status();
        let payload: serde_json::Value = response.json().await?;
        if !status.is_success() {
            anyhow::bail!("whatsapp api returned {status}: {payload}");
        }

        let parsed: WhatsAppSendResponse = serde_json::from_value(payload.clone())?;
        Ok(ProviderReceipt {
            provider_message_id: parsed.messages.into_iter().next().map(|m| m.id),
            raw: payload,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WhatsAppSendResponse {
    #[serde(default)]
    messages: Vec<WhatsAppMessageRef>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageRef {
    id: String,
}
