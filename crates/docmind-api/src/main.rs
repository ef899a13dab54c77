use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use docmind_api::{
    build_router,
    config::{CheckpointBackend, Config},
    state::AppState,
};
use docmind_graph::Graph;
use docmind_llm::ClientFactory;
use docmind_persist::{CheckpointStore, FileCheckpointStore, InMemoryCheckpointStore};
use docmind_retrieval::{InMemoryContextStore, Pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting DocMind API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let openai_config = config.openai_config();
    tracing::info!(
        base_url = openai_config.base_url.as_deref().unwrap_or("https://api.openai.com/v1"),
        answer_model = %config.llm.answer_model,
        utility_model = %config.llm.utility_model,
        "Initializing chat client"
    );
    let client = ClientFactory::create_chat_client(openai_config)?;

    let context_store = InMemoryContextStore::new();
    for (pool, files) in [
        (Pool::Local, &config.retrieval.local_files),
        (Pool::Web, &config.retrieval.web_files),
    ] {
        for path in files {
            let count = context_store.load_json_file(pool, path).await?;
            tracing::info!(pool = %pool, path = %path.display(), documents = count, "Loaded documents");
        }
    }
    if context_store.is_empty().await {
        tracing::warn!("No documents loaded; answers will have no retrieved context");
    }

    let checkpoint_store: Arc<dyn CheckpointStore> = match config.checkpoint.backend {
        CheckpointBackend::Memory => Arc::new(InMemoryCheckpointStore::new()),
        CheckpointBackend::File => {
            tracing::info!(dir = %config.checkpoint.dir.display(), "Persisting threads to disk");
            Arc::new(FileCheckpointStore::new(config.checkpoint.dir.clone()))
        }
    };

    let graph = Graph::builder()
        .client(client)
        .context_store(Arc::new(context_store))
        .checkpoint_store(checkpoint_store)
        .config(config.graph_config())
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), graph));

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Liveness: http://{}/hello", addr);
    tracing::info!("API docs: http://{}/api/docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
