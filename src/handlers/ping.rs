use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::traits::FrameHandler;
use crate::client::Client;
use crate::types::frame::Frame;

/// Handler for heartbeat replies.
///
/// A pong only confirms the path is alive; there is nothing to do with it.
/// A missing pong is likewise not acted upon here — the heartbeat is
/// best-effort, recovery belongs to the reconnect loop.
pub struct PongHandler;

#[async_trait]
impl FrameHandler for PongHandler {
    fn kind(&self) -> &'static str {
        "pong"
    }

    async fn handle(&self, _client: Arc<Client>, _frame: &Frame) -> bool {
        debug!(target: "Client/Keepalive", "Received heartbeat pong");
        true
    }
}
