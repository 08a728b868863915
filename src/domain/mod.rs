mod chat_turn;
mod chunk;
mod document;
mod embedding;
mod ingestion_state;
mod message_role;

pub use chat_turn::ChatTurn;
pub use chunk::{Chunk, ChunkId, DocumentId};
pub use document::{ContentType, Document, Page, SourceFile};
pub use embedding::Embedding;
pub use ingestion_state::IngestionState;
pub use message_role::MessageRole;
