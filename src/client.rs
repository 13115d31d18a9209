use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::time::{Duration, sleep};

use crate::cache::ConversationCache;
use crate::gateway::{AttachmentRef, ChatGateway, GatewayError};
use crate::handlers::router::FrameRouter;
use crate::presence::TypingPresence;
use crate::render::{Notifier, Renderer};
use crate::transport::{Transport, TransportEvent, TransportFactory};
use crate::types::conversation::ConversationId;
use crate::types::frame::{Frame, TypingSignal, typing_wire};
use crate::types::message::Message;
use crate::types::user::SessionUser;
use crate::unread::UnreadTracker;

/// Fixed delay between reconnect attempts. Constant, not exponential: a
/// simplification this protocol tolerates, since the liveness hint recovers
/// the common mobile case immediately anyway.
pub(crate) const RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,
    #[error("client is already connected")]
    AlreadyConnected,
    #[error("frame encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(String),
}

/// The realtime conversation session.
///
/// Owns the one live connection, the conversation cache, the unread counters
/// and the typing indicator; collaborators (renderer, notifier, gateway,
/// transport factory) are constructor-injected. One `Client` exists per
/// authenticated session and dies with it at logout.
pub struct Client {
    session: SessionUser,
    cache: ConversationCache,
    unread: UnreadTracker,
    typing: Arc<TypingPresence>,
    router: FrameRouter,
    renderer: Arc<dyn Renderer>,
    gateway: Arc<dyn ChatGateway>,

    transport: Mutex<Option<Arc<dyn Transport>>>,
    transport_events: Mutex<Option<mpsc::Receiver<TransportEvent>>>,
    transport_factory: Arc<dyn TransportFactory>,

    state_tx: watch::Sender<ConnectionState>,
    is_connecting: AtomicBool,
    is_running: AtomicBool,
    expected_disconnect: AtomicBool,
    /// Bumped per successful connection; lets per-connection tasks detect
    /// they are stale after a quick reconnect.
    connection_generation: AtomicU64,
    shutdown_notifier: Notify,
    /// Wakes a pending reconnect sleep. At most one reconnect is ever
    /// scheduled (the supervisor loop's single sleep), so waking it is also
    /// how a stale retry gets cancelled.
    liveness_hint: Notify,

    focused: Mutex<Option<ConversationId>>,
    chat_visible: AtomicBool,
}

impl Client {
    pub fn new(
        session: SessionUser,
        transport_factory: Arc<dyn TransportFactory>,
        gateway: Arc<dyn ChatGateway>,
        renderer: Arc<dyn Renderer>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Arc::new(Self {
            cache: ConversationCache::new(session.id.clone()),
            unread: UnreadTracker::new(renderer.clone(), notifier),
            typing: TypingPresence::new(renderer.clone()),
            router: FrameRouter::with_default_handlers(),
            renderer,
            gateway,
            session,

            transport: Mutex::new(None),
            transport_events: Mutex::new(None),
            transport_factory,

            state_tx,
            is_connecting: AtomicBool::new(false),
            is_running: AtomicBool::new(false),
            expected_disconnect: AtomicBool::new(false),
            connection_generation: AtomicU64::new(0),
            shutdown_notifier: Notify::new(),
            liveness_hint: Notify::new(),

            focused: Mutex::new(None),
            chat_visible: AtomicBool::new(false),
        })
    }

    pub fn session(&self) -> &SessionUser {
        &self.session
    }

    pub fn cache(&self) -> &ConversationCache {
        &self.cache
    }

    pub fn unread(&self) -> &UnreadTracker {
        &self.unread
    }

    pub(crate) fn typing(&self) -> &Arc<TypingPresence> {
        &self.typing
    }

    pub(crate) fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Watch channel mirroring every connection state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub(crate) fn connection_generation(&self) -> u64 {
        self.connection_generation.load(Ordering::SeqCst)
    }

    pub(crate) fn shutdown_notified(&self) -> tokio::sync::futures::Notified<'_> {
        self.shutdown_notifier.notified()
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = *self.state_tx.borrow();
        if prev == next {
            return;
        }
        info!(target: "Client", "Connection state: {prev:?} -> {next:?}");
        self.state_tx.send_replace(next);
    }

    /// The supervisor loop: connect, pump frames, and on failure schedule one
    /// reconnect after a fixed delay. Runs until `disconnect` ends the
    /// session. Calling it twice is a no-op.
    pub async fn run(self: &Arc<Self>) {
        if self.is_running.swap(true, Ordering::SeqCst) {
            warn!(target: "Client", "run() called while already running");
            return;
        }

        while self.is_running.load(Ordering::Relaxed) {
            self.expected_disconnect.store(false, Ordering::Relaxed);

            match self.connect().await {
                Err(e) => error!(target: "Client", "Connect failed: {e}"),
                Ok(()) => {
                    if let Err(e) = self.read_frames_loop().await {
                        warn!(target: "Client", "Frame loop exited: {e}");
                    } else {
                        debug!(target: "Client", "Frame loop exited cleanly.");
                    }
                    self.cleanup_connection_state().await;
                }
            }

            if !self.is_running.load(Ordering::Relaxed) {
                break;
            }

            info!(target: "Client", "Reconnecting in {RECONNECT_DELAY:?}");
            tokio::select! {
                _ = sleep(RECONNECT_DELAY) => {}
                _ = self.liveness_hint.notified() => {
                    info!(target: "Client", "Liveness hint received, reconnecting immediately");
                }
                _ = self.shutdown_notifier.notified() => break,
            }
        }

        self.set_state(ConnectionState::Disconnected);
        info!(target: "Client", "Supervisor loop shut down.");
    }

    /// Opens the transport. Exactly one attempt may be in flight; a second
    /// caller gets `AlreadyConnected`.
    pub async fn connect(self: &Arc<Self>) -> Result<(), anyhow::Error> {
        if self.is_connecting.swap(true, Ordering::SeqCst) {
            return Err(ClientError::AlreadyConnected.into());
        }
        let _guard = scopeguard::guard((), |_| {
            self.is_connecting.store(false, Ordering::Relaxed);
        });

        if self.is_connected() {
            return Err(ClientError::AlreadyConnected.into());
        }

        self.set_state(ConnectionState::Connecting);

        let (transport, transport_events) = match self.transport_factory.create_transport().await
        {
            Ok(pair) => pair,
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        *self.transport.lock().await = Some(transport);
        *self.transport_events.lock().await = Some(transport_events);

        let generation = self.connection_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.set_state(ConnectionState::Connected);

        let client = self.clone();
        tokio::spawn(async move { client.keepalive_loop(generation).await });

        Ok(())
    }

    /// Intentional teardown (logout). The supervisor loop will not restart.
    pub async fn disconnect(&self) {
        info!(target: "Client", "Disconnecting intentionally.");
        self.expected_disconnect.store(true, Ordering::Relaxed);
        self.is_running.store(false, Ordering::Relaxed);
        self.shutdown_notifier.notify_waiters();

        if let Some(transport) = self.transport.lock().await.as_ref() {
            transport.disconnect().await;
        }
        self.cleanup_connection_state().await;
    }

    /// Ends the session. The identity dies with this client; a new login
    /// constructs a new `Client`.
    pub async fn logout(&self) {
        self.disconnect().await;
    }

    async fn cleanup_connection_state(&self) {
        self.set_state(ConnectionState::Disconnected);
        *self.transport.lock().await = None;
        *self.transport_events.lock().await = None;
    }

    /// Pumps transport events until the connection ends. Frames are handled
    /// inline, in strict arrival order: cache and counter updates must be
    /// serialized, so nothing is spawned here.
    async fn read_frames_loop(self: &Arc<Self>) -> Result<(), anyhow::Error> {
        let mut transport_events = self
            .transport_events
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("cannot start frame loop: not connected"))?;

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_notifier.notified() => {
                    info!(target: "Client", "Shutdown signaled, exiting frame loop.");
                    return Ok(());
                }
                event = transport_events.recv() => match event {
                    Some(TransportEvent::FrameReceived(raw)) => {
                        self.process_raw_frame(&raw).await;
                    }
                    Some(TransportEvent::Connected) => {
                        debug!(target: "Client", "Transport connected event received");
                    }
                    Some(TransportEvent::Disconnected) | None => {
                        if self.expected_disconnect.load(Ordering::Relaxed) {
                            info!(target: "Client", "Transport disconnected as expected.");
                            return Ok(());
                        }
                        return Err(anyhow::anyhow!("transport disconnected unexpectedly"));
                    }
                }
            }
        }
    }

    /// Classifies one raw frame and routes it. Malformed frames are dropped
    /// with a warning; a bad frame never breaks the link.
    pub(crate) async fn process_raw_frame(self: &Arc<Self>, raw: &str) {
        let frame = match Frame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(target: "Client/Recv", "Dropping malformed frame: {e}");
                return;
            }
        };

        if let Frame::Unknown(tag) = &frame {
            debug!(target: "Client/Recv", "Ignoring unknown frame kind {tag:?}");
            return;
        }

        self.dispatch_frame(frame).await;
    }

    /// Hands one classified frame to the router. Public entry point so hosts
    /// and tests can feed pre-decoded frames.
    pub async fn dispatch_frame(self: &Arc<Self>, frame: Frame) -> bool {
        let consumed = self.router.dispatch(self.clone(), &frame).await;
        if !consumed {
            debug!(target: "Client/Recv", "No handler consumed {} frame", frame.kind());
        }
        consumed
    }

    pub(crate) async fn send_raw_frame(&self, frame: &str) -> Result<(), ClientError> {
        let transport = self
            .transport
            .lock()
            .await
            .clone()
            .ok_or(ClientError::NotConnected)?;
        transport
            .send_frame(frame)
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    pub async fn focused_conversation(&self) -> Option<ConversationId> {
        self.focused.lock().await.clone()
    }

    /// Focused AND actually on-screen — the only state in which inbound
    /// messages render directly instead of counting as unread.
    pub async fn is_focused_and_visible(&self, conversation: &ConversationId) -> bool {
        self.chat_visible.load(Ordering::Relaxed)
            && self.focused.lock().await.as_ref() == Some(conversation)
    }

    /// The host tells us whether the conversation view is on-screen
    /// (distinct from which conversation is selected).
    pub fn set_chat_visible(&self, visible: bool) {
        self.chat_visible.store(visible, Ordering::Relaxed);
    }

    /// Selects a conversation: zeroes its unread counter, marks the view
    /// visible and pulls history. The fetch failure is the caller's to
    /// handle (or retry); focus has already changed by then.
    pub async fn open_conversation(
        self: &Arc<Self>,
        conversation: ConversationId,
    ) -> Result<(), GatewayError> {
        {
            let mut focused = self.focused.lock().await;
            if focused.as_ref() != Some(&conversation) {
                // The indicator belongs to the previous view.
                self.typing.clear().await;
            }
            *focused = Some(conversation.clone());
        }
        self.set_chat_visible(true);
        self.unread.on_focus(&conversation);

        let history = self.gateway.fetch_history(&conversation).await?;
        let added = self.cache.merge(history);
        debug!(
            target: "Client/History",
            "Opened {conversation}: {added} new of {} cached", self.cache.len(&conversation)
        );
        self.renderer
            .on_conversation_refreshed(&conversation, &self.cache.snapshot(&conversation));
        Ok(())
    }

    /// Deselects the current conversation (e.g. navigating back to the list).
    pub async fn close_conversation(&self) {
        *self.focused.lock().await = None;
        self.typing.clear().await;
    }

    /// External liveness hint: the host became visible/foregrounded.
    ///
    /// Mobile platforms drop connections without a close event; this is the
    /// recovery path. If we are not connected, the pending reconnect fires
    /// immediately. The focused conversation is resynced either way, since
    /// frames may have been lost while suspended.
    pub async fn on_became_visible(self: &Arc<Self>) {
        if !self.is_connected() {
            info!(target: "Client", "Liveness hint while {:?}", self.state());
            self.liveness_hint.notify_waiters();
        }

        if let Some(conversation) = self.focused_conversation().await {
            if let Err(e) = self.resync_conversation(&conversation).await {
                warn!(target: "Client/History", "Resync of {conversation} failed: {e}");
            }
        }
    }

    /// Pulls history and re-renders only if the merge was not a no-op.
    async fn resync_conversation(
        &self,
        conversation: &ConversationId,
    ) -> Result<(), GatewayError> {
        let history = self.gateway.fetch_history(conversation).await?;
        let added = self.cache.merge(history);
        if added > 0 {
            info!(target: "Client/History", "Resync pulled {added} new messages for {conversation}");
            self.renderer
                .on_conversation_refreshed(conversation, &self.cache.snapshot(conversation));
        }
        Ok(())
    }

    /// Submits a message via the gateway. Nothing is inserted locally: the
    /// echo over the live connection is the authoritative record, and there
    /// is no automatic retry — re-sending is a user decision.
    pub async fn send_message(
        &self,
        conversation: &ConversationId,
        content: Option<String>,
        attachment: Option<AttachmentRef>,
    ) -> Result<Message, GatewayError> {
        self.gateway
            .send_message(conversation, content, attachment)
            .await
    }

    /// Announces local typing in a conversation. One signal per raw input
    /// change; no local throttling.
    pub async fn send_typing(&self, conversation: &ConversationId) -> Result<(), ClientError> {
        let signal = TypingSignal::outbound(&self.session.id, conversation);
        self.send_raw_frame(&typing_wire(&signal)?).await
    }
}
