use async_trait::async_trait;
use std::sync::Arc;

use crate::client::Client;
use crate::types::frame::Frame;

/// Trait for handling one kind of inbound protocol frame.
///
/// Each handler is responsible for a single frame kind ("pong", "typing",
/// "message"). The router keeps frame classification out of the client's read
/// loop and makes adding frame kinds a local change.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    /// The frame kind this handler consumes (`Frame::kind`).
    fn kind(&self) -> &'static str;

    /// Handles the frame. Handlers run inline on the read loop, in arrival
    /// order; they must never panic on bad input.
    ///
    /// Returns `true` if the frame was consumed.
    async fn handle(&self, client: Arc<Client>, frame: &Frame) -> bool;
}
