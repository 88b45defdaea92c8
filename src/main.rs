use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use pond_core::{EngineConfig, SelfIdentity};
use pond_engine::{ReportFormatter, ReportScope, ScoreAggregator, StrategyPipeline};
use pond_server::ServerConfig;
use pond_session::TracingSink;
use pond_store::{Database, SqliteLogSource};
use pond_telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "pond", about = "Affinity scoring over per-partner chat logs")]
struct Cli {
    /// The operator's own identity as the transport names it.
    #[arg(long, env = "POND_SELF")]
    me: String,

    /// Database path. Defaults to ~/.pond/database/pond.db.
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP ingest + report server.
    Serve {
        #[arg(long, default_value_t = 7071)]
        port: u16,
    },
    /// Print the ranked affinity report.
    Report {
        /// Every partner instead of the top N.
        #[arg(long, conflicts_with = "top")]
        all: bool,
        /// How many partners to show.
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print the raw score map as JSON.
    Scores,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let identity = SelfIdentity::new(&cli.me);
    let engine = EngineConfig::default();
    let db_path = cli.db.unwrap_or_else(default_db_path);

    match cli.command {
        Command::Serve { port } => {
            let telemetry = init_telemetry(TelemetryConfig::default());
            let db = Database::open(&db_path).context("open database")?;

            let config = ServerConfig {
                port,
                ..Default::default()
            };
            let handle = pond_server::start(
                config,
                db,
                identity,
                engine,
                Arc::new(TracingSink),
                telemetry.logs(),
            )
            .await
            .context("start server")?;
            tracing::info!(port = handle.port, me = %cli.me, "pond ready");

            tokio::signal::ctrl_c().await.context("listen for ctrl+c")?;
            tracing::info!("shutting down");
        }
        Command::Report { all, top } => {
            stderr_logging();
            let (aggregator, formatter, source) = batch_parts(&db_path, identity, &engine)?;
            let scores = aggregator.compute_scores(&source)?;
            let scope = if all {
                ReportScope::All
            } else if let Some(n) = top {
                ReportScope::Top(n)
            } else {
                formatter.default_scope()
            };
            print!("{}", formatter.build(&scores, scope, &source).render());
        }
        Command::Scores => {
            stderr_logging();
            let (aggregator, _, source) = batch_parts(&db_path, identity, &engine)?;
            let scores = aggregator.compute_scores(&source)?;
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
    }

    Ok(())
}

fn batch_parts(
    db_path: &PathBuf,
    identity: SelfIdentity,
    engine: &EngineConfig,
) -> anyhow::Result<(ScoreAggregator, ReportFormatter, SqliteLogSource)> {
    let db = Database::open(db_path).context("open database")?;
    let aggregator = ScoreAggregator::new(StrategyPipeline::from_config(engine), identity);
    let formatter = ReportFormatter::new(&engine.tunables);
    Ok((aggregator, formatter, SqliteLogSource::new(db)))
}

/// Keep stdout clean for report output; warnings still land on stderr.
fn stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn default_db_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".pond/database/pond.db")
}
