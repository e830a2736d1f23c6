use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::services::sender::{ChannelSender, ProviderReceipt};
use crate::domain::models::{ChannelType, SendingCredentials};

pub struct TelegramSender {
    http: Client,
    base_url: String,
}

impl TelegramSender {
    pub fn new(base_url: String, timeout: Duration) -> Arc<dyn ChannelSender> {
        Arc::new(Self {
            http: Client::builder()
                .user_agent("outreach/telegram")
                .timeout(timeout)
                .build()
                .expect("failed to build telegram client"),
            base_url,
        }) as Arc<dyn ChannelSender>
    }

    fn build_url(&self, credentials: &SendingCredentials, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, credentials.access_token, method)
    }
}

#[async_trait]
impl ChannelSender for TelegramSender {
    fn channel(&self) -> ChannelType {
        ChannelType::Telegram
    }

    async fn send(
        &self,
        credentials: &SendingCredentials,
        destination: &str,
        body: &str,
    ) -> anyhow::Result<ProviderReceipt> {
        let url = self.build_url(credentials, "sendMessage");
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({
                "chat_id": destination,
                "text": body,
            }))
            .send()
            .await?;

        let payload: TelegramSendResponse = response.json().await?;
        if !payload.ok {
            anyhow::bail!(
                "telegram api returned error: {}",
                payload
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }

        Ok(ProviderReceipt {
            provider_message_id: payload
                .result
                .as_ref()
                .map(|m| m.message_id.to_string()),
            raw: serde_json::to_value(&payload.result).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TelegramSendResponse {
    ok: bool,
    description: Option<String>,
    result: Option<TelegramMessageRef>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct TelegramMessageRef {
    message_id: i64,
}
