use log::{debug, warn};
use std::sync::Arc;
use tokio::time::{Duration, sleep};

use crate::client::Client;
use crate::types::frame::ping_wire;

pub(crate) const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

impl Client {
    /// Sends a heartbeat ping every 30 seconds for as long as the connection
    /// that spawned this task is still the current one.
    ///
    /// The heartbeat is best-effort: a failed send is logged and the loop
    /// keeps going. Dead links surface through the transport event stream,
    /// not here.
    pub(crate) async fn keepalive_loop(self: Arc<Self>, generation: u64) {
        debug!(target: "Client/Keepalive", "Keepalive loop starting (gen {generation})");

        loop {
            tokio::select! {
                _ = sleep(KEEP_ALIVE_INTERVAL) => {}
                _ = self.shutdown_notified() => {
                    debug!(target: "Client/Keepalive", "Shutdown signaled, stopping keepalive");
                    return;
                }
            }

            // A reconnect may have replaced the transport while we slept.
            if self.connection_generation() != generation {
                debug!(
                    target: "Client/Keepalive",
                    "Connection superseded (gen {generation}), stopping keepalive"
                );
                return;
            }
            if !self.is_connected() {
                debug!(target: "Client/Keepalive", "Not connected, stopping keepalive");
                return;
            }

            if let Err(e) = self.send_raw_frame(&ping_wire()).await {
                warn!(target: "Client/Keepalive", "Failed to send ping: {e}");
            }
        }
    }
}
