//! `georag` binary: ingestion, console chat and the HTTP chat service.
//!
//! ```bash
//! georag ingest docs/handbook.pdf notes.md
//! georag chat
//! georag serve
//!
//! # with the in-memory store, seed it in the same process
//! georag chat --ingest docs/handbook.pdf
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tokio::net::TcpListener;

use georag::application::ports::{CollectionConfig, Embedder, VectorStore};
use georag::infrastructure::llm::EmbedderFactory;
use georag::infrastructure::observability::{TracingConfig, init_tracing};
use georag::infrastructure::persistence::create_vector_store;
use georag::presentation::pipeline::{
    ChatService, build_ingestion_service, build_retrieval_service, seed_collection,
};
use georag::presentation::{AppState, Environment, Settings, create_router, run_console_chat};

#[derive(Parser)]
#[command(name = "georag")]
#[command(about = "Retrieval-augmented chat over your own documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, chunk, embed and store documents, one after another
    Ingest {
        /// PDF, text or markdown files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Drop the collection before ingesting
        #[arg(long)]
        reset: bool,
    },

    /// Interactive question/answer loop on the terminal
    Chat {
        /// Files to ingest before the first question
        #[arg(long = "ingest", value_name = "FILES", num_args = 1..)]
        ingest: Vec<PathBuf>,
    },

    /// Serve the streaming chat API over HTTP
    Serve {
        /// Files to ingest before accepting requests
        #[arg(long = "ingest", value_name = "FILES", num_args = 1..)]
        ingest: Vec<PathBuf>,
    },

    /// Show the configured collection
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));
    tracing::info!(%environment, "Configuration loaded");

    let embedder = EmbedderFactory::create(&settings.embeddings)?;
    let vector_store =
        create_vector_store(settings.vector_store.backend, &settings.database).await?;
    let collection = CollectionConfig::for_embedder(
        settings.vector_store.collection_name.clone(),
        embedder.as_ref(),
    )
    .with_distance_metric(settings.vector_store.distance_metric);

    match cli.command {
        Commands::Ingest { files, reset } => {
            ingest(&settings, embedder, vector_store, collection, &files, reset).await
        }
        Commands::Chat { ingest } => {
            let retrieval_service =
                query_pipeline(&settings, embedder, vector_store, collection, &ingest).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            run_console_chat(&retrieval_service, stdin, &mut stdout).await?;
            Ok(())
        }
        Commands::Serve { ingest } => {
            let retrieval_service =
                query_pipeline(&settings, embedder, vector_store, collection, &ingest).await?;
            serve(&settings, retrieval_service).await
        }
        Commands::Status => {
            match vector_store.collection_info(&collection.name).await? {
                Some(info) => println!(
                    "collection {}: {} records, model {}, {} dimensions, {} distance",
                    info.name,
                    info.record_count,
                    info.embedding_model,
                    info.dimensions,
                    info.distance_metric
                ),
                None => println!("collection {} does not exist yet", collection.name),
            }
            Ok(())
        }
    }
}

async fn ingest(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    collection: CollectionConfig,
    files: &[PathBuf],
    reset: bool,
) -> Result<()> {
    if reset {
        vector_store.delete_collection(&collection.name).await?;
        tracing::info!(collection = %collection.name, "Collection reset");
    }

    let ingestion_service = build_ingestion_service(settings, embedder, vector_store, collection)?;

    let reports = ingestion_service
        .ingest_files(files)
        .await
        .context("ingestion failed")?;
    for report in reports {
        println!(
            "{}: {} pages, {} chunks -> {}",
            report.source, report.pages, report.chunks, report.collection
        );
    }

    Ok(())
}

async fn query_pipeline(
    settings: &Settings,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    collection: CollectionConfig,
    files: &[PathBuf],
) -> Result<Arc<ChatService>> {
    seed_collection(
        settings,
        Arc::clone(&embedder),
        Arc::clone(&vector_store),
        collection.clone(),
        files,
    )
    .await
    .context("ingestion failed")?;

    Ok(build_retrieval_service(settings, embedder, vector_store, collection)?)
}

async fn serve(
    settings: &Settings,
    retrieval_service: Arc<ChatService>,
) -> Result<()> {
    let router = create_router(AppState::new(retrieval_service));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
