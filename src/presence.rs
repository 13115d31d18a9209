use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use crate::render::Renderer;
use crate::types::conversation::ConversationId;

/// How long the typing indicator dwells after the latest signal.
pub const TYPING_DWELL: Duration = Duration::from_secs(3);

struct Marker {
    conversation: ConversationId,
    generation: u64,
}

/// Ephemeral, self-expiring "peer is typing" indicator.
///
/// At most one marker is displayed at a time; the latest signal wins. Each
/// signal bumps a generation counter and arms a fresh expiry task; a stale
/// task whose generation lost finds the newer marker and leaves it alone, so
/// refreshed signals keep the indicator up (debounced display, not a
/// minimum-display-time guarantee).
pub struct TypingPresence {
    renderer: Arc<dyn Renderer>,
    marker: Mutex<Option<Marker>>,
    generation: AtomicU64,
}

impl TypingPresence {
    pub fn new(renderer: Arc<dyn Renderer>) -> Arc<Self> {
        Arc::new(Self {
            renderer,
            marker: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    /// Records the signal and (re)starts the expiry clock. The caller has
    /// already checked that `conversation` is the focused one.
    pub async fn on_signal(self: &Arc<Self>, conversation: ConversationId, sender_id: String) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut marker = self.marker.lock().await;
            *marker = Some(Marker {
                conversation: conversation.clone(),
                generation,
            });
        }
        self.renderer.on_typing_shown(&conversation, &sender_id);

        let this = self.clone();
        tokio::spawn(async move {
            sleep(TYPING_DWELL).await;
            this.expire(generation).await;
        });
    }

    async fn expire(&self, generation: u64) {
        let mut marker = self.marker.lock().await;
        match marker.take() {
            Some(m) if m.generation == generation => {
                debug!(target: "Client/Typing", "Indicator expired for {}", m.conversation);
                self.renderer.on_typing_cleared(&m.conversation);
            }
            // A newer signal owns the indicator, or it was already cleared.
            other => *marker = other,
        }
    }

    /// Clears the indicator immediately (focus change). Idempotent: safe to
    /// call with nothing shown, and a pending expiry firing afterwards is a
    /// no-op.
    pub async fn clear(&self) {
        if let Some(m) = self.marker.lock().await.take() {
            self.renderer.on_typing_cleared(&m.conversation);
        }
    }
}
