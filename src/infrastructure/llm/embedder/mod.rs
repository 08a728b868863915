mod embedder_factory;
mod hashing_embedder;
mod openai_embedder;

pub use embedder_factory::{
    DASHSCOPE_BASE_URL, EmbedderFactory, EmbedderFactoryError, OPENAI_BASE_URL,
};
pub use hashing_embedder::HashingEmbedder;
pub use openai_embedder::OpenAiEmbedder;

pub(crate) use embedder_factory::resolve_api_key;
