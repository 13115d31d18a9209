use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use crate::render::{Notifier, Renderer};
use crate::types::conversation::ConversationId;

/// Per-conversation unread counters.
///
/// Invariant: the counter of the focused-and-visible conversation is always
/// zero — accepted messages for it never increment, and focusing resets.
pub struct UnreadTracker {
    counts: DashMap<ConversationId, u64>,
    renderer: Arc<dyn Renderer>,
    notifier: Arc<dyn Notifier>,
}

impl UnreadTracker {
    pub fn new(renderer: Arc<dyn Renderer>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            counts: DashMap::new(),
            renderer,
            notifier,
        }
    }

    /// Called once per distinct accepted inbound message (never per display
    /// refresh). Own messages and messages for the focused-and-visible
    /// conversation leave the counter untouched; everything else increments
    /// by exactly one and fires the badge update plus the notification
    /// side effect.
    pub fn on_message_accepted(
        &self,
        conversation: &ConversationId,
        is_own: bool,
        is_focused_and_visible: bool,
    ) {
        if is_own || is_focused_and_visible {
            return;
        }

        let count = {
            let mut entry = self.counts.entry(conversation.clone()).or_insert(0);
            *entry += 1;
            *entry
        };
        debug!(target: "Client/Unread", "{conversation}: {count} unread");

        self.renderer.on_badge_changed(conversation, count);
        self.notifier.notify();
    }

    /// A conversation became focused-and-visible: its counter drops to zero.
    /// Other conversations are unaffected.
    pub fn on_focus(&self, conversation: &ConversationId) {
        self.counts.insert(conversation.clone(), 0);
        debug!(target: "Client/Unread", "{conversation}: cleared");
        self.renderer.on_badge_changed(conversation, 0);
    }

    pub fn count(&self, conversation: &ConversationId) -> u64 {
        self.counts.get(conversation).map(|c| *c).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingNotifier, RecordingRenderer};

    fn tracker() -> (UnreadTracker, Arc<RecordingRenderer>, Arc<CountingNotifier>) {
        let renderer = Arc::new(RecordingRenderer::default());
        let notifier = Arc::new(CountingNotifier::default());
        (
            UnreadTracker::new(renderer.clone(), notifier.clone()),
            renderer,
            notifier,
        )
    }

    #[test]
    fn accepted_message_increments_and_notifies_once() {
        let (tracker, renderer, notifier) = tracker();
        let conv = ConversationId::Peer("alice".to_string());

        tracker.on_message_accepted(&conv, false, false);
        assert_eq!(tracker.count(&conv), 1);
        assert_eq!(notifier.count(), 1);
        assert_eq!(renderer.badges(), vec![(conv.clone(), 1)]);

        tracker.on_message_accepted(&conv, false, false);
        assert_eq!(tracker.count(&conv), 2);
        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn own_messages_never_count() {
        let (tracker, _renderer, notifier) = tracker();
        let conv = ConversationId::Peer("alice".to_string());

        tracker.on_message_accepted(&conv, true, false);
        assert_eq!(tracker.count(&conv), 0);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn focused_and_visible_messages_never_count() {
        let (tracker, _renderer, notifier) = tracker();
        let conv = ConversationId::Peer("alice".to_string());

        tracker.on_message_accepted(&conv, false, true);
        assert_eq!(tracker.count(&conv), 0);
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn focus_resets_only_that_conversation() {
        let (tracker, renderer, _notifier) = tracker();
        let alice = ConversationId::Peer("alice".to_string());
        let group = ConversationId::Group("g1".to_string());

        tracker.on_message_accepted(&alice, false, false);
        tracker.on_message_accepted(&group, false, false);
        tracker.on_focus(&alice);

        assert_eq!(tracker.count(&alice), 0);
        assert_eq!(tracker.count(&group), 1);
        assert_eq!(renderer.badges().last(), Some(&(alice, 0)));
    }

    #[test]
    fn focusing_an_untouched_conversation_stays_zero() {
        let (tracker, _renderer, _notifier) = tracker();
        let conv = ConversationId::Group("g1".to_string());

        tracker.on_focus(&conv);
        tracker.on_focus(&conv);
        assert_eq!(tracker.count(&conv), 0);
    }
}
