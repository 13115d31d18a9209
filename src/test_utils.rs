use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::client::Client;
use crate::gateway::{AttachmentRef, ChatGateway, GatewayError};
use crate::render::{Notifier, Renderer};
use crate::transport::mock::MockTransportFactory;
use crate::types::conversation::ConversationId;
use crate::types::message::Message;
use crate::types::user::{GroupInfo, SessionUser, UserInfo};

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

/// Gateway returning empty results everywhere.
pub struct NullGateway;

#[async_trait]
impl ChatGateway for NullGateway {
    async fn fetch_history(
        &self,
        _conversation: &ConversationId,
    ) -> Result<Vec<Message>, GatewayError> {
        Ok(Vec::new())
    }

    async fn send_message(
        &self,
        _conversation: &ConversationId,
        _content: Option<String>,
        _attachment: Option<AttachmentRef>,
    ) -> Result<Message, GatewayError> {
        Err(GatewayError::Transport("null gateway".to_string()))
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
        Err(GatewayError::Transport("null gateway".to_string()))
    }
}

/// A client wired to mocks, for unit tests that need the full object graph.
pub(crate) fn test_client() -> Arc<Client> {
    Client::new(
        SessionUser {
            id: "local-user".to_string(),
            full_name: "Local User".to_string(),
            role: "member".to_string(),
        },
        Arc::new(MockTransportFactory::new()),
        Arc::new(NullGateway),
        Arc::new(RecordingRenderer::default()),
        Arc::new(CountingNotifier::default()),
    )
}
