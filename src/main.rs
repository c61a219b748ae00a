use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketd::ai::Classifier;
use ticketd::api::{AppState, router};
use ticketd::config::ConfigLoader;
use ticketd::storage::{Database, TicketStore};

#[derive(Parser)]
#[command(name = "ticketd")]
#[command(
    version,
    about = "Support ticket tracking service with LLM-assisted classification"
)]
struct Cli {
    /// Configuration file path
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Bind address (overrides configuration)
    #[arg(long)]
    bind: Option<String>,

    /// Database file path (overrides configuration)
    #[arg(long)]
    db: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_with_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let db = Database::open(&config.database.path)?;
    db.initialize()?;
    info!(path = %config.database.path.display(), "Database ready");

    let classifier = Classifier::new(&config.llm);
    if classifier.is_enabled() {
        info!(provider = %config.llm.provider, "LLM classification enabled");
    } else {
        info!("LLM classification disabled, classify returns defaults");
    }

    let state = AppState {
        store: TicketStore::new(Arc::new(db)),
        classifier: Arc::new(classifier),
    };

    let addr: SocketAddr = config.server.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
