use std::fmt;

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::error::StoreError;

/// Author of a persisted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable chat message.
///
/// Timestamps are normalized to UTC with microsecond precision, which is
/// exactly what the store can represent, so a saved message reloads equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
    timestamp: OffsetDateTime,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: normalize_timestamp(timestamp),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    fn not_before(mut self, floor: OffsetDateTime) -> Self {
        if self.timestamp < floor {
            self.timestamp = floor;
        }
        self
    }
}

/// A named, ordered sequence of messages with a stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    id: String,
    name: String,
    messages: Vec<Message>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl Conversation {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: OffsetDateTime) -> Self {
        let created_at = normalize_timestamp(created_at);
        Self {
            id: id.into(),
            name: name.into(),
            messages: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Rebuilds a conversation from persisted parts without re-deriving anything.
    #[must_use]
    pub fn from_parts(
        id: impl Into<String>,
        name: impl Into<String>,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
        messages: Vec<Message>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            messages,
            created_at: normalize_timestamp(created_at),
            updated_at: normalize_timestamp(updated_at),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends `message`, clamping its timestamp so send order never runs backwards.
    pub fn push_message(&mut self, message: Message) {
        let message = match self.messages.last() {
            Some(last) => message.not_before(last.timestamp),
            None => message,
        };
        if message.timestamp > self.updated_at {
            self.updated_at = message.timestamp;
        }
        self.messages.push(message);
    }
}

fn normalize_timestamp(timestamp: OffsetDateTime) -> OffsetDateTime {
    let utc = timestamp.to_offset(UtcOffset::UTC);
    utc - Duration::nanoseconds(i64::from(utc.nanosecond() % 1_000))
}

/// Formats a timestamp as fixed-width UTC RFC 3339 with microseconds.
///
/// Fixed width keeps lexical order equal to chronological order in SQL.
#[must_use]
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let utc = normalize_timestamp(timestamp);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        utc.year(),
        u8::from(utc.month()),
        utc.day(),
        utc.hour(),
        utc.minute(),
        utc.second(),
        utc.microsecond()
    )
}

/// Parses a stored timestamp.
///
/// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS[.f]±HH:MM`
/// form some SQLite drivers write for `DATETIME` columns.
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<OffsetDateTime, StoreError> {
    let trimmed = value.trim();
    let candidate = match trimmed.as_bytes().get(10) {
        Some(b' ') => format!("{}T{}", &trimmed[..10], &trimmed[11..]),
        _ => trimmed.to_string(),
    };

    OffsetDateTime::parse(&candidate, &Rfc3339)
        .map(normalize_timestamp)
        .map_err(|_| StoreError::timestamp(field, value))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn role_round_trips_through_wire_names() {
        assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
        assert_eq!(Role::parse("assistant"), Some(Role::Assistant));
        assert_eq!(Role::parse("system"), None);
    }

    #[test]
    fn timestamps_format_fixed_width_utc() {
        let ts = datetime!(2024-03-05 07:08:09.123456789 +02:00);
        assert_eq!(format_timestamp(ts), "2024-03-05T05:08:09.123456Z");
        assert_eq!(
            parse_timestamp("created_at", "2024-03-05T05:08:09.123456Z").expect("parse"),
            datetime!(2024-03-05 05:08:09.123456 UTC)
        );
    }

    #[test]
    fn legacy_space_separated_timestamps_parse() {
        let parsed = parse_timestamp("created_at", "2024-03-05 07:08:09.5+02:00").expect("parse");
        assert_eq!(parsed, datetime!(2024-03-05 05:08:09.5 UTC));
        assert!(parse_timestamp("created_at", "yesterday").is_err());
    }

    #[test]
    fn push_message_clamps_backwards_timestamps() {
        let start = datetime!(2024-01-01 00:00:10 UTC);
        let mut conversation = Conversation::new("c1", "New Chat", start);
        conversation.push_message(Message::new(Role::User, "first", start));
        conversation.push_message(Message::new(
            Role::Assistant,
            "second",
            datetime!(2024-01-01 00:00:05 UTC),
        ));

        let times: Vec<_> = conversation
            .messages()
            .iter()
            .map(Message::timestamp)
            .collect();
        assert_eq!(times, vec![start, start]);
        assert_eq!(conversation.updated_at(), start);
    }
}
