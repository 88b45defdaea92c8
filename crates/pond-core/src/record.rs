use serde::{Deserialize, Serialize};

use crate::errors::RecordError;
use crate::identity::SelfIdentity;

/// Which side of the conversation sent a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    /// The opposite side.
    pub fn flip(self) -> Self {
        match self {
            Self::Outgoing => Self::Incoming,
            Self::Incoming => Self::Outgoing,
        }
    }
}

/// Content kind of a message. Voice is tracked distinctly because it has a
/// dedicated tally; everything else non-text collapses into `Media`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Voice,
    Media,
}

impl MessageKind {
    /// Map a transport kind label onto the normalized kind.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "voice" | "recording" => Self::Voice,
            _ => Self::Media,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Media => "media",
        }
    }
}

/// A message event as delivered by the transport or read back from the log
/// store. May be malformed; normalization decides.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawMessage {
    pub sender: Option<String>,
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub kind: String,
    pub text: Option<String>,
}

impl RawMessage {
    pub fn text(sender: impl Into<String>, timestamp: i64, text: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            timestamp: Some(timestamp),
            kind: "text".into(),
            text: Some(text.into()),
        }
    }

    pub fn voice(sender: impl Into<String>, timestamp: i64) -> Self {
        Self {
            sender: Some(sender.into()),
            timestamp: Some(timestamp),
            kind: "voice".into(),
            text: None,
        }
    }
}

/// One normalized unit of conversation history. Immutable after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub direction: Direction,
    /// Seconds since epoch as declared by the transport. Arrival order is
    /// the log order; this value is not guaranteed monotonic.
    pub timestamp: i64,
    pub kind: MessageKind,
    pub text: String,
}

impl MessageRecord {
    /// Normalize a raw event. Direction comes from comparing the sender
    /// against the operator identity; non-text kinds get their label
    /// substituted into `text` so text-reading tallies never special-case.
    pub fn from_raw(raw: &RawMessage, me: &SelfIdentity) -> Result<Self, RecordError> {
        let sender = raw.sender.as_deref().ok_or(RecordError::MissingSender)?;
        let timestamp = raw.timestamp.ok_or(RecordError::MissingTimestamp)?;

        let direction = if me.is_self(sender) {
            Direction::Outgoing
        } else {
            Direction::Incoming
        };

        let kind = MessageKind::from_label(&raw.kind);
        let text = match kind {
            MessageKind::Text => raw.text.clone().unwrap_or_default(),
            other => other.label().to_string(),
        };

        Ok(Self {
            direction,
            timestamp,
            kind,
            text,
        })
    }
}
