//! CLI application for the domain chatbot service.

use chatbot_api::{create_router, AppState};
use chatbot_chat::{ChatService, PromptDomain};
use chatbot_db::DbPool;
use chatbot_llm::{groq, GroqClient, LlmConfig};
use chatbot_rag::{DocumentIngestor, HashingEmbedder, VectorStore, DEFAULT_TOP_K};
use chatbot_telemetry::{init_logging, Metrics};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(about = "Domain-specific chatbot with document-grounded answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StorageArgs {
    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://chatbot.db")]
    database_url: String,

    /// Directory for uploaded files
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    media_root: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory receiving chatbot_log/chatbot_log.log
    #[arg(long, env = "LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        #[command(flatten)]
        storage: StorageArgs,

        /// Address to bind the HTTP server to
        #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:8000")]
        bind_address: String,

        /// Groq API key
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        groq_api_key: String,

        /// Domain whose system prompt is used
        #[arg(long, env = "PROMPT_DOMAIN", default_value = "general")]
        prompt_domain: String,

        /// Chat completion model
        #[arg(long, env = "LLM_MODEL", default_value = groq::DEFAULT_MODEL)]
        llm_model: String,

        /// OpenAI-compatible API base URL
        #[arg(long, env = "LLM_BASE_URL", default_value = groq::DEFAULT_BASE_URL)]
        llm_base_url: String,

        /// Sampling temperature
        #[arg(long, env = "LLM_TEMPERATURE", default_value_t = groq::DEFAULT_TEMPERATURE)]
        llm_temperature: f64,

        /// Completion token limit
        #[arg(long, env = "LLM_MAX_TOKENS", default_value_t = groq::DEFAULT_MAX_TOKENS)]
        llm_max_tokens: u32,

        /// Chunks injected into grounded replies
        #[arg(long, env = "RAG_TOP_K", default_value_t = DEFAULT_TOP_K)]
        rag_top_k: usize,
    },
    /// Apply database migrations
    Migrate {
        #[command(flatten)]
        storage: StorageArgs,
    },
    /// Index local files into the retrieval store
    Ingest {
        #[command(flatten)]
        storage: StorageArgs,

        /// Files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Source label; defaults to each file's name
        #[arg(long)]
        source: Option<String>,
    },
    /// List the available prompt domains
    PromptDomains,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            storage,
            bind_address,
            groq_api_key,
            prompt_domain,
            llm_model,
            llm_base_url,
            llm_temperature,
            llm_max_tokens,
            rag_top_k,
        } => {
            init_logging(storage.log_level.as_deref(), Some(&storage.log_dir))?;
            let domain: PromptDomain = prompt_domain.parse()?;
            let llm = LlmConfig {
                model: llm_model,
                base_url: llm_base_url,
                temperature: llm_temperature,
                max_tokens: llm_max_tokens,
                ..LlmConfig::new(groq_api_key)
            };
            serve(&storage, &bind_address, domain, llm, rag_top_k).await?;
        }
        Commands::Migrate { storage } => {
            init_logging(storage.log_level.as_deref(), Some(&storage.log_dir))?;
            let db = DbPool::new(&storage.database_url).await?;
            db.migrate().await?;
            db.close().await;
        }
        Commands::Ingest {
            storage,
            files,
            source,
        } => {
            init_logging(storage.log_level.as_deref(), Some(&storage.log_dir))?;
            ingest_files(&storage, &files, source.as_deref()).await?;
        }
        Commands::PromptDomains => {
            for domain in PromptDomain::ALL {
                println!("{}", domain);
            }
        }
    }

    Ok(())
}

async fn open_ingestor(storage: &StorageArgs, metrics: &Metrics) -> anyhow::Result<(DbPool, DocumentIngestor)> {
    let db = DbPool::new(&storage.database_url).await?;
    db.migrate().await?;

    let store = VectorStore::new(db.clone(), Arc::new(HashingEmbedder::default()));
    let ingestor = DocumentIngestor::new(db.clone(), store, &storage.media_root, metrics.clone());
    Ok((db, ingestor))
}

async fn serve(
    storage: &StorageArgs,
    bind_address: &str,
    domain: PromptDomain,
    llm: LlmConfig,
    top_k: usize,
) -> anyhow::Result<()> {
    info!("Starting chatbot service with {} prompt domain", domain);

    let metrics = Metrics::new()?;
    let (db, ingestor) = open_ingestor(storage, &metrics).await?;

    info!("Using model {} at {}", llm.model, llm.base_url);
    let model = Arc::new(GroqClient::new(llm)?);
    let chat = ChatService::new(db.clone(), model, domain, metrics.clone())
        .with_retrieval(ingestor.store().clone());

    let state = AppState::new(chat, ingestor, metrics).with_top_k(top_k).shared();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Chatbot server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Chatbot server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn ingest_files(storage: &StorageArgs, files: &[PathBuf], source: Option<&str>) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let (db, ingestor) = open_ingestor(storage, &metrics).await?;

    let mut total = 0;
    for path in files {
        let source_name = match source {
            Some(source) => source.to_string(),
            None => file_label(path),
        };

        match ingestor.ingest_file(path, &source_name, None).await {
            Ok((0, extractor)) => {
                warn!("No text indexed from {:?} (via {})", path, extractor.name());
            }
            Ok((count, extractor)) => {
                info!("Indexed {} chunks from {:?} (via {})", count, path, extractor.name());
                total += count;
            }
            Err(e) => error!("Failed to ingest {:?}: {}", path, e),
        }
    }

    info!("Indexed {} chunks from {} files", total, files.len());
    db.close().await;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
