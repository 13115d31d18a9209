use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::traits::FrameHandler;
use crate::client::Client;
use crate::types::frame::Frame;

/// Handler for typing signals.
///
/// The server only fans typing signals out to participants, but the client
/// filters defensively anyway: a signal reaches the typing presence only when
/// its conversation is the one currently focused. Everything else is
/// discarded silently.
pub struct TypingHandler;

#[async_trait]
impl FrameHandler for TypingHandler {
    fn kind(&self) -> &'static str {
        "typing"
    }

    async fn handle(&self, client: Arc<Client>, frame: &Frame) -> bool {
        let Frame::Typing(signal) = frame else {
            return false;
        };

        let Some(conversation) = signal.conversation_for(&client.session().id) else {
            debug!(target: "Client/Typing", "Typing signal without a local target, dropping");
            return true;
        };

        if client.focused_conversation().await.as_ref() != Some(&conversation) {
            return true;
        }

        client
            .typing()
            .on_signal(conversation, signal.user_id.clone())
            .await;
        true
    }
}
