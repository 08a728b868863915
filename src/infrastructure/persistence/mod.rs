mod in_memory_vector_store;
mod pg_pool;
mod pg_vector_store;
mod vector_store_factory;

pub use in_memory_vector_store::InMemoryVectorStore;
pub use pg_pool::create_pool;
pub use pg_vector_store::PgVectorStore;
pub use vector_store_factory::create_vector_store;
