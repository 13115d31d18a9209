use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::conversation::ConversationId;

/// One chat message as it appears on the wire.
///
/// Messages are server-assigned records: the client only ever merges them into
/// its cache, never mutates or deletes them. The field names are
/// compatibility-critical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(with = "ts")]
    pub timestamp: DateTime<Utc>,
    /// "personal" or "group" on the wire; informational only, the conversation
    /// binding is derived from the id fields.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Message {
    /// Derives the conversation this message belongs to, seen from `local_id`.
    ///
    /// Canonical rule, applied uniformly: group id if present, else the
    /// participant id that is NOT the local session's id. Returns `None` for a
    /// direct message that names no counterpart.
    pub fn conversation_for(&self, local_id: &str) -> Option<ConversationId> {
        if let Some(group_id) = &self.group_id {
            return Some(ConversationId::Group(group_id.clone()));
        }
        if self.sender_id == local_id {
            self.recipient_id.clone().map(ConversationId::Peer)
        } else {
            Some(ConversationId::Peer(self.sender_id.clone()))
        }
    }
}

/// Timestamp (de)serialization for the chat server's wire format.
///
/// The server emits naive ISO-8601 datetimes (UTC implied, no offset suffix),
/// so plain RFC 3339 parsing is not enough.
pub(crate) mod ts {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.naive_utc().to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(with_offset.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}
