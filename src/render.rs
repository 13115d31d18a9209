use log::info;

use crate::types::conversation::ConversationId;
use crate::types::message::Message;

/// Sink for everything the session wants shown on screen.
///
/// The core makes no assumption about how (or whether) these are displayed;
/// implementations must not block, calls happen on the frame-processing path.
pub trait Renderer: Send + Sync {
    /// A new message arrived for the focused-and-visible conversation.
    fn on_message_appended(&self, conversation: &ConversationId, message: &Message);

    /// The unread badge for a conversation changed.
    fn on_badge_changed(&self, conversation: &ConversationId, count: u64);

    fn on_typing_shown(&self, conversation: &ConversationId, sender_id: &str);

    fn on_typing_cleared(&self, conversation: &ConversationId);

    /// A history merge changed the conversation; `snapshot` is the full
    /// ordered view to replace the current one.
    fn on_conversation_refreshed(&self, conversation: &ConversationId, snapshot: &[Message]);
}

/// Opaque notification side effect (sound, vibration, ...). Invoked once per
/// newly-unread message; implementations swallow their own failures.
pub trait Notifier: Send + Sync {
    fn notify(&self);
}

/// Renderer that just logs, for headless use and the debug CLI.
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn on_message_appended(&self, conversation: &ConversationId, message: &Message) {
        info!(
            target: "Renderer",
            "[{conversation}] {}: {}",
            message.sender_name.as_deref().unwrap_or(&message.sender_id),
            message.content.as_deref().unwrap_or("<attachment>")
        );
    }

    fn on_badge_changed(&self, conversation: &ConversationId, count: u64) {
        info!(target: "Renderer", "[{conversation}] unread: {count}");
    }

    fn on_typing_shown(&self, conversation: &ConversationId, sender_id: &str) {
        info!(target: "Renderer", "[{conversation}] {sender_id} is typing...");
    }

    fn on_typing_cleared(&self, conversation: &ConversationId) {
        info!(target: "Renderer", "[{conversation}] typing cleared");
    }

    fn on_conversation_refreshed(&self, conversation: &ConversationId, snapshot: &[Message]) {
        info!(target: "Renderer", "[{conversation}] refreshed, {} messages", snapshot.len());
    }
}

/// Notifier that logs instead of making noise.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self) {
        info!(target: "Renderer", "*ding*");
    }
}
