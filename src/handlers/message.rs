use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::traits::FrameHandler;
use crate::client::Client;
use crate::types::frame::Frame;

/// Handler for chat-message frames.
///
/// Every message goes to the cache first (idempotent insert). Net-new
/// messages are then either shown directly — when their conversation is
/// focused AND the chat pane is actually on-screen — or accounted as unread.
/// Duplicates (a history fetch racing the live frame) were already displayed
/// and counted, so they stop here.
pub struct MessageHandler;

#[async_trait]
impl FrameHandler for MessageHandler {
    fn kind(&self) -> &'static str {
        "message"
    }

    async fn handle(&self, client: Arc<Client>, frame: &Frame) -> bool {
        let Frame::Message(message) = frame else {
            return false;
        };

        let Some(insertion) = client.cache().insert(message.as_ref().clone()) else {
            return true;
        };
        if !insertion.inserted {
            debug!(target: "Client/Recv", "Duplicate message {}, ignoring", message.id);
            return true;
        }

        let conversation = insertion.conversation;
        let is_own = message.sender_id == client.session().id;
        let focused_and_visible = client.is_focused_and_visible(&conversation).await;

        if focused_and_visible {
            client.renderer().on_message_appended(&conversation, message);
        }
        client
            .unread()
            .on_message_accepted(&conversation, is_own, focused_and_visible);

        true
    }
}
