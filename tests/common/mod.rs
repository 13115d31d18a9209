#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use corpchat_client::client::Client;
use corpchat_client::gateway::{AttachmentRef, ChatGateway, GatewayError};
use corpchat_client::render::{Notifier, Renderer};
use corpchat_client::transport::{Transport, TransportEvent, TransportFactory};
use corpchat_client::types::conversation::ConversationId;
use corpchat_client::types::message::Message;
use corpchat_client::types::user::{GroupInfo, SessionUser, UserInfo};

pub const LOCAL_USER: &str = "bob";

/// Renderer that records every call for assertion.
#[derive(Default)]
pub struct RecordingRenderer {
    appended: Mutex<Vec<(ConversationId, Message)>>,
    badges: Mutex<Vec<(ConversationId, u64)>>,
    typing_shown: Mutex<Vec<(ConversationId, String)>>,
    typing_cleared: Mutex<Vec<ConversationId>>,
    refreshed: Mutex<Vec<(ConversationId, Vec<Message>)>>,
}

impl RecordingRenderer {
    pub fn appended(&self) -> Vec<(ConversationId, Message)> {
        self.appended.lock().unwrap().clone()
    }

    pub fn badges(&self) -> Vec<(ConversationId, u64)> {
        self.badges.lock().unwrap().clone()
    }

    pub fn typing_shown(&self) -> Vec<(ConversationId, String)> {
        self.typing_shown.lock().unwrap().clone()
    }

    pub fn typing_cleared(&self) -> Vec<ConversationId> {
        self.typing_cleared.lock().unwrap().clone()
    }

    pub fn refreshed(&self) -> Vec<(ConversationId, Vec<Message>)> {
        self.refreshed.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn on_message_appended(&self, conversation: &ConversationId, message: &Message) {
        self.appended
            .lock()
            .unwrap()
            .push((conversation.clone(), message.clone()));
    }

    fn on_badge_changed(&self, conversation: &ConversationId, count: u64) {
        self.badges
            .lock()
            .unwrap()
            .push((conversation.clone(), count));
    }

    fn on_typing_shown(&self, conversation: &ConversationId, sender_id: &str) {
        self.typing_shown
            .lock()
            .unwrap()
            .push((conversation.clone(), sender_id.to_string()));
    }

    fn on_typing_cleared(&self, conversation: &ConversationId) {
        self.typing_cleared.lock().unwrap().push(conversation.clone());
    }

    fn on_conversation_refreshed(&self, conversation: &ConversationId, snapshot: &[Message]) {
        self.refreshed
            .lock()
            .unwrap()
            .push((conversation.clone(), snapshot.to_vec()));
    }
}

/// Notifier that counts invocations.
#[derive(Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn notify(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Gateway that serves a fixed history for every conversation.
#[derive(Default)]
pub struct StaticGateway {
    history: Mutex<Vec<Message>>,
}

impl StaticGateway {
    pub fn with_history(history: Vec<Message>) -> Self {
        Self {
            history: Mutex::new(history),
        }
    }
}

#[async_trait]
impl ChatGateway for StaticGateway {
    async fn fetch_history(
        &self,
        _conversation: &ConversationId,
    ) -> Result<Vec<Message>, GatewayError> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn send_message(
        &self,
        _conversation: &ConversationId,
        _content: Option<String>,
        _attachment: Option<AttachmentRef>,
    ) -> Result<Message, GatewayError> {
        Err(GatewayError::Transport("static gateway".to_string()))
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, GatewayError> {
        Ok(Vec::new())
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>, GatewayError> {
        Ok(Vec::new())
    }

    async fn create_group(
        &self,
        _name: &str,
        _description: Option<&str>,
        _member_ids: &[String],
    ) -> Result<GroupInfo, GatewayError> {
        Err(GatewayError::Transport("static gateway".to_string()))
    }
}

/// Test-side handle to one scripted connection.
pub struct TransportLink {
    /// Injects server-to-client transport events.
    pub events: mpsc::Sender<TransportEvent>,
    /// Receives every frame the client sent on this connection.
    pub sent: mpsc::UnboundedReceiver<String>,
}

struct ScriptedTransport {
    sent: mpsc::UnboundedSender<String>,
    events: mpsc::Sender<TransportEvent>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_frame(&self, frame: &str) -> Result<(), anyhow::Error> {
        self.sent
            .send(frame.to_string())
            .map_err(|_| anyhow::anyhow!("test side dropped the sent channel"))
    }

    async fn disconnect(&self) {
        let _ = self.events.send(TransportEvent::Disconnected).await;
    }
}

/// Factory that hands each new connection's link to the test.
pub struct ScriptedTransportFactory {
    links: mpsc::UnboundedSender<TransportLink>,
    connects: Arc<AtomicUsize>,
}

impl ScriptedTransportFactory {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportLink>, Arc<AtomicUsize>) {
        let (links_tx, links_rx) = mpsc::unbounded_channel();
        let connects = Arc::new(AtomicUsize::new(0));
        (
            Self {
                links: links_tx,
                connects: connects.clone(),
            },
            links_rx,
            connects,
        )
    }
}

#[async_trait]
impl TransportFactory for ScriptedTransportFactory {
    async fn create_transport(
        &self,
    ) -> Result<(Arc<dyn Transport>, mpsc::Receiver<TransportEvent>), anyhow::Error> {
        let (events_tx, events_rx) = mpsc::channel(100);
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();

        self.connects.fetch_add(1, Ordering::SeqCst);
        events_tx
            .send(TransportEvent::Connected)
            .await
            .map_err(|_| anyhow::anyhow!("event channel closed before connect"))?;
        self.links
            .send(TransportLink {
                events: events_tx.clone(),
                sent: sent_rx,
            })
            .map_err(|_| anyhow::anyhow!("test side dropped the link channel"))?;

        Ok((
            Arc::new(ScriptedTransport {
                sent: sent_tx,
                events: events_tx,
            }),
            events_rx,
        ))
    }
}

pub struct Harness {
    pub client: Arc<Client>,
    pub renderer: Arc<RecordingRenderer>,
    pub notifier: Arc<CountingNotifier>,
    pub links: mpsc::UnboundedReceiver<TransportLink>,
    pub connects: Arc<AtomicUsize>,
}

/// Client wired to a scripted transport and a fixed-history gateway,
/// logged in as `LOCAL_USER`.
pub fn harness(history: Vec<Message>) -> Harness {
    let renderer = Arc::new(RecordingRenderer::default());
    let notifier = Arc::new(CountingNotifier::default());
    let (factory, links, connects) = ScriptedTransportFactory::new();

    let client = Client::new(
        SessionUser {
            id: LOCAL_USER.to_string(),
            full_name: "Bob".to_string(),
            role: "member".to_string(),
        },
        Arc::new(factory),
        Arc::new(StaticGateway::with_history(history)),
        renderer.clone(),
        notifier.clone(),
    );

    Harness {
        client,
        renderer,
        notifier,
        links,
        connects,
    }
}

pub fn msg(id: &str, sender: &str, recipient: &str, ts_secs: i64) -> Message {
    Message {
        id: id.to_string(),
        sender_id: sender.to_string(),
        sender_name: None,
        recipient_id: Some(recipient.to_string()),
        group_id: None,
        content: Some(format!("message {id}")),
        file_url: None,
        file_name: None,
        file_size: None,
        timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
        kind: None,
    }
}
