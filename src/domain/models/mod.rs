pub mod campaign;
pub mod channel;
pub mod conversation;
pub mod message;
pub mod sequence;

pub use campaign::{Campaign, CampaignContact, CampaignStatus, ContactStatus};
pub use channel::{ChannelType, CredentialsStatus, SendingCredentials};
pub use conversation::{Client, Conversation, ConversationStatus};
pub use message::{Message, MessageMeta, MessageStatus, SenderKind};
pub use sequence::{FollowUp, FollowUpStatus, SequenceRule};
