mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    ChatSettings, ChunkingSettings, DatabaseSettings, EmbeddingProvider, EmbeddingsSettings,
    ENV_PREFIX, ENV_SEPARATOR, LlmProvider, LlmSettings, LoggingSettings, RetrievalSettings,
    ServerSettings, Settings, SettingsError, VectorStoreBackend, VectorStoreSettings,
};
