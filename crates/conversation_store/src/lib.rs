mod error;
mod model;
mod paths;
mod schema;
mod store;

pub use error::StoreError;
pub use model::{format_timestamp, parse_timestamp, Conversation, Message, Role};
pub use paths::{default_database_path, DATA_DIR, DATABASE_FILE};
pub use store::{ConversationStore, SqliteConversationStore};
