use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::conversation::ConversationId;
use super::message::Message;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid frame json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a json object")]
    NotAnObject,
}

/// Ephemeral "participant is typing" signal.
///
/// Wire shape: `{"type":"typing","user_id":...,"recipient_id"|"group_id":...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypingSignal {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl TypingSignal {
    /// The conversation this signal targets, seen from `local_id`.
    ///
    /// A direct signal only reaches us as its recipient, in which case the
    /// conversation is the typist's peer chat. Anything else has no local
    /// target and is dropped by the dispatcher.
    pub fn conversation_for(&self, local_id: &str) -> Option<ConversationId> {
        if let Some(group_id) = &self.group_id {
            return Some(ConversationId::Group(group_id.clone()));
        }
        if self.recipient_id.as_deref() == Some(local_id) {
            return Some(ConversationId::Peer(self.user_id.clone()));
        }
        None
    }

    /// Builds the outbound signal for local typing in `conversation`.
    pub fn outbound(user_id: &str, conversation: &ConversationId) -> Self {
        match conversation {
            ConversationId::Peer(id) => Self {
                user_id: user_id.to_string(),
                recipient_id: Some(id.clone()),
                group_id: None,
            },
            ConversationId::Group(id) => Self {
                user_id: user_id.to_string(),
                recipient_id: None,
                group_id: Some(id.clone()),
            },
        }
    }
}

/// One classified inbound protocol frame.
#[derive(Clone, Debug)]
pub enum Frame {
    /// Heartbeat reply; confirms liveness, nothing else.
    Pong,
    Typing(TypingSignal),
    Message(Box<Message>),
    /// Unrecognized frame kind. Kept around (with its `type` tag, if any) so
    /// the dispatcher can log it; never an error.
    Unknown(Option<String>),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pong => "pong",
            Self::Typing(_) => "typing",
            Self::Message(_) => "message",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Classifies one decoded frame. Rules checked in order:
    /// pong, typing, chat message (has an id and a payload), otherwise unknown.
    ///
    /// Only structurally invalid input is an error; unknown kinds parse fine
    /// so a newer server cannot break the read loop.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(FrameError::NotAnObject);
        }

        match value.get("type").and_then(Value::as_str) {
            Some("pong") => return Ok(Self::Pong),
            Some("typing") => return Ok(Self::Typing(serde_json::from_value(value)?)),
            _ => {}
        }

        let has_id = value.get("id").and_then(Value::as_str).is_some();
        let has_payload = value
            .get("content")
            .and_then(Value::as_str)
            .is_some_and(|c| !c.is_empty())
            || value.get("file_url").and_then(Value::as_str).is_some();
        if has_id && has_payload {
            return Ok(Self::Message(Box::new(serde_json::from_value(value)?)));
        }

        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(Self::Unknown(tag))
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

/// Outbound heartbeat frame. Fixed shape, cannot fail to encode.
pub fn ping_wire() -> String {
    r#"{"type":"ping"}"#.to_string()
}

/// Outbound typing frame.
pub fn typing_wire(signal: &TypingSignal) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Tagged {
        kind: "typing",
        body: signal,
    })
}
