use std::collections::HashMap;
use std::sync::Arc;

use super::traits::FrameHandler;
use crate::client::Client;
use crate::types::frame::Frame;

/// Central router for dispatching classified frames to their handlers.
pub struct FrameRouter {
    handlers: HashMap<&'static str, Arc<dyn FrameHandler>>,
}

impl FrameRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Router wired with the protocol's standard handlers.
    pub(crate) fn with_default_handlers() -> Self {
        use super::{message::MessageHandler, ping::PongHandler, typing::TypingHandler};

        let mut router = Self::new();
        router.register(Arc::new(PongHandler));
        router.register(Arc::new(TypingHandler));
        router.register(Arc::new(MessageHandler));
        router
    }

    /// Register a handler for a frame kind.
    ///
    /// # Panics
    /// Panics if a handler is already registered for the same kind, to
    /// prevent accidental overwrites during initialization.
    pub fn register(&mut self, handler: Arc<dyn FrameHandler>) {
        let kind = handler.kind();
        if self.handlers.insert(kind, handler).is_some() {
            panic!("Handler for frame kind '{kind}' already registered");
        }
    }

    /// Dispatch a frame to its handler.
    ///
    /// Returns `true` if a handler was found and consumed the frame, `false`
    /// for kinds nobody registered (unknown frames end up here and are
    /// ignored — a new frame kind must never break the dispatcher).
    pub async fn dispatch(&self, client: Arc<Client>, frame: &Frame) -> bool {
        if let Some(handler) = self.handlers.get(frame.kind()) {
            handler.handle(client, frame).await
        } else {
            false
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for FrameRouter {
    fn default() -> Self {
        Self::new()
    }
}
