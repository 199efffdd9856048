//! SQLite schema shared with databases written by earlier releases.
//!
//! `conversations.id` stays nullable at the column level so old
//! files open unchanged; rows without an id are filtered on read instead.

pub(crate) const PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
);

CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at DATETIME NOT NULL,
    FOREIGN KEY (conversation_id) REFERENCES conversations (id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation_id ON messages(conversation_id);
CREATE INDEX IF NOT EXISTS idx_conversations_updated_at ON conversations(updated_at DESC);
";

pub(crate) const UPSERT_CONVERSATION: &str = "
INSERT INTO conversations (id, name, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT(id) DO UPDATE SET
    name = excluded.name,
    updated_at = excluded.updated_at";

pub(crate) const DELETE_MESSAGES: &str = "DELETE FROM messages WHERE conversation_id = ?1";

pub(crate) const INSERT_MESSAGE: &str = "
INSERT INTO messages (conversation_id, role, content, created_at)
VALUES (?1, ?2, ?3, ?4)";

pub(crate) const SELECT_CONVERSATIONS: &str = "
SELECT id, name, created_at, updated_at
FROM conversations
ORDER BY created_at ASC, rowid ASC";

pub(crate) const SELECT_MESSAGES: &str = "
SELECT role, content, created_at
FROM messages
WHERE conversation_id = ?1
ORDER BY created_at ASC, id ASC";

pub(crate) const DELETE_CONVERSATION: &str = "DELETE FROM conversations WHERE id = ?1";
