//! Tokio/tungstenite implementation of the transport.
//!
//! The chat protocol is one JSON object per WebSocket text message, so no
//! extra framing layer sits between the socket and the dispatcher.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::transport::{Transport, TransportEvent, TransportFactory};

type RawWs = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<RawWs, Message>;
type WsStream = SplitStream<RawWs>;

const EVENT_CHANNEL_CAPACITY: usize = 100;

pub struct WebSocketTransport {
    ws_sink: Arc<Mutex<Option<WsSink>>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_frame(&self, frame: &str) -> Result<(), anyhow::Error> {
        let mut sink_guard = self.ws_sink.lock().await;
        let sink = sink_guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("socket is closed"))?;

        debug!(target: "Transport", "--> Sending frame: {} bytes", frame.len());
        sink.send(Message::text(frame))
            .await
            .map_err(|e| anyhow::anyhow!("websocket send error: {e}"))
    }

    async fn disconnect(&self) {
        let mut sink_guard = self.ws_sink.lock().await;
        if let Some(mut sink) = sink_guard.take() {
            let _ = sink.close().await;
        }
    }
}

/// Factory for WebSocket transports addressed by the session's participant id.
pub struct WebSocketTransportFactory {
    url: String,
}

impl WebSocketTransportFactory {
    /// `url` is the full endpoint including the participant id,
    /// e.g. `wss://chat.example.com/ws/<user_id>`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl TransportFactory for WebSocketTransportFactory {
    async fn create_transport(
        &self,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
        info!(target: "Transport", "Dialing {}", self.url);
        let (ws, _response) = connect_async(&self.url)
            .await
            .map_err(|e| anyhow::anyhow!("websocket connect failed: {e}"))?;

        let (sink, stream) = ws.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let transport = Arc::new(WebSocketTransport {
            ws_sink: Arc::new(Mutex::new(Some(sink))),
        });

        tokio::spawn(read_pump(stream, event_tx.clone()));

        let _ = event_tx.send(TransportEvent::Connected).await;

        Ok((transport, event_rx))
    }
}

async fn read_pump(mut stream: WsStream, event_tx: mpsc::Sender<TransportEvent>) {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => {
                trace!(target: "Transport", "<-- Received frame: {} bytes", text.len());
                if event_tx
                    .send(TransportEvent::FrameReceived(text.to_string()))
                    .await
                    .is_err()
                {
                    warn!(target: "Transport", "Event receiver dropped, closing read pump");
                    break;
                }
            }
            Some(Ok(Message::Close(_))) => {
                trace!(target: "Transport", "Received close frame");
                break;
            }
            // Control frames; tungstenite answers pings internally.
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!(target: "Transport", "Error reading from websocket: {e}");
                break;
            }
            None => {
                trace!(target: "Transport", "Websocket stream ended");
                break;
            }
        }
    }

    let _ = event_tx.send(TransportEvent::Disconnected).await;
}
