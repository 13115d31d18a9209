use std::fmt;

/// Addressable unit of messaging: a direct peer or a group.
///
/// This is the key for message caching, unread counters and typing state.
/// Identity is the id plus the discriminant; there is no nesting.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConversationId {
    /// Direct conversation, identified by the peer's participant id.
    Peer(String),
    /// Group conversation, identified by the group id.
    Group(String),
}

impl ConversationId {
    pub fn key(&self) -> &str {
        match self {
            Self::Peer(id) | Self::Group(id) => id,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peer(id) => write!(f, "peer:{id}"),
            Self::Group(id) => write!(f, "group:{id}"),
        }
    }
}
