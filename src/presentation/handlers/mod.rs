mod chat_stream;
mod error_response;
mod health;
mod retrieve;

pub use chat_stream::{ChatStreamRequest, ChatTurnPayload, chat_stream_handler};
pub use error_response::ErrorResponse;
pub use health::{health_handler, readiness_handler};
pub use retrieve::retrieve_handler;
