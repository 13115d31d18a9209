use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::types::conversation::ConversationId;
use crate::types::message::Message;
use crate::types::user::{GroupInfo, UserInfo};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("request failed with status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Reference to an already-uploaded attachment. Upload mechanics live outside
/// the core; the session only passes the reference along.
#[derive(Clone, Debug, Serialize)]
pub struct AttachmentRef {
    pub url: String,
    pub name: String,
    pub size: u64,
}

/// Request/response side of the chat server, distinct from the live
/// connection path.
///
/// Failures surface to the immediate caller as a `GatewayError` and never
/// crash the session; the core retries nothing on its own. A sent message is
/// confirmed by its echo over the live connection, not by the response here.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// History of one conversation, as the server orders it.
    async fn fetch_history(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, GatewayError>;

    /// Submits a message. The returned record is the server's synchronous
    /// answer; the cache is fed by the echo, never by this value.
    async fn send_message(
        &self,
        conversation: &ConversationId,
        content: Option<String>,
        attachment: Option<AttachmentRef>,
    ) -> Result<Message, GatewayError>;

    async fn list_users(&self) -> Result<Vec<UserInfo>, GatewayError>;

    async fn list_groups(&self) -> Result<Vec<GroupInfo>, GatewayError>;

    async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        member_ids: &[String],
    ) -> Result<GroupInfo, GatewayError>;
}
