use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::models::{ChannelType, SendingCredentials};

/// Whatever the provider returned for a successful send.
#[derive(Debug, Clone, Default)]
pub struct ProviderReceipt {
    pub provider_message_id: Option<String>,
    pub raw: serde_json::Value,
}

/// Network delivery to one messaging provider. Assumed slow, rate-limited
/// and fallible; implementations must bound the request with a timeout, and
/// a timeout is indistinguishable from an explicit failure to callers.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    fn channel(&self) -> ChannelType;
    async fn send(
        &self,
        credentials: &SendingCredentials,
        destination: &str,
        body: &str,
    ) -> anyhow::Result<ProviderReceipt>;
}

#[derive(Clone)]
pub struct SenderGateway {
    senders: HashMap<ChannelType, Arc<dyn ChannelSender>>,
}

impl SenderGateway {
    pub fn new(senders: Vec<Arc<dyn ChannelSender>>) -> Self {
        let mut map = HashMap::new();
        for sender in senders {
            map.insert(sender.channel(), sender);
        }
        Self { senders: map }
    }

    pub fn get(&self, channel: ChannelType) -> Option<Arc<dyn ChannelSender>> {
        self.senders.get(&channel).cloned()
    }
}
