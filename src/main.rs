use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use solace_core::provider::TextGenerator;
use solace_engine::{ResponsePolicy, SentimentScorer, SqliteConversationStore};
use solace_llm::{DisabledGenerator, OpenAiProvider};
use solace_server::{AppConfig, AppState};
use solace_store::Database;
use solace_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser, Debug)]
#[command(name = "solace")]
#[command(version, about = "Solace - supportive chat backend with sentiment and crisis awareness")]
struct Cli {
    /// Port to listen on (overrides SOLACE_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database path (overrides SOLACE_DB_PATH).
    #[arg(long)]
    db: Option<PathBuf>,

    /// Skip the startup retention sweep.
    #[arg(long)]
    no_sweep: bool,

    /// Persist warn+ log records to the log database.
    #[arg(long)]
    log_to_sqlite: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("reading configuration from environment")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if cli.no_sweep {
        config.run_retention_sweep = false;
    }

    let telemetry = init_telemetry(TelemetryConfig {
        log_level: config.log_level,
        log_to_sqlite: cli.log_to_sqlite,
        ..Default::default()
    });

    info!("Starting Solace server");

    let db = Database::open(&config.database_path)
        .with_context(|| format!("opening database at {}", config.database_path.display()))?;

    let generator: Arc<dyn TextGenerator> = match config.openai_api_key.clone() {
        Some(key) => Arc::new(
            OpenAiProvider::with_base_url(key, Some(&config.model), &config.openai_base_url)
                .context("building OpenAI provider")?,
        ),
        None => {
            warn!("OPENAI_API_KEY not set, every chat turn will use the fallback reply");
            Arc::new(DisabledGenerator::new("no API key configured"))
        }
    };

    let store = Arc::new(SqliteConversationStore::new(db.clone()));
    let mut policy = ResponsePolicy::new(generator, store).with_timeout(config.generation_timeout);
    if let Some(path) = &config.vader_lexicon {
        let scorer = SentimentScorer::from_vader_file(path)
            .with_context(|| format!("loading VADER lexicon from {}", path.display()))?;
        policy = policy.with_scorer(scorer);
    }
    let policy = Arc::new(policy);

    if config.run_retention_sweep {
        solace_server::run_retention_sweep(&db, config.retention_days);
        if let Some(logs) = telemetry.logs() {
            match logs.prune_older_than(config.retention_days) {
                Ok(pruned) => info!(pruned, "pruned persisted log records"),
                Err(e) => warn!(error = %e, "log retention sweep failed"),
            }
        }
    }

    let handle = solace_server::start(&config.server, AppState::new(db, policy))
        .await
        .context("starting HTTP server")?;

    info!(port = handle.port, "Solace server ready");

    tokio::signal::ctrl_c()
        .await
        .context("listening for ctrl-c")?;

    info!("Shutting down");
    handle.shutdown().await;
    Ok(())
}
