mod embedder;
mod llm_client_factory;
mod scaffold_llm_client;
mod streaming_client;

pub use embedder::{EmbedderFactory, EmbedderFactoryError, HashingEmbedder, OpenAiEmbedder};
pub use llm_client_factory::create_llm_client;
pub use scaffold_llm_client::ScaffoldLlmClient;
pub use streaming_client::StreamingLlmClient;
