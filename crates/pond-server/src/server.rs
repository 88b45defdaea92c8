use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use pond_core::{EngineConfig, NotificationSink, SelfIdentity};
use pond_engine::{ReportFormatter, ScoreAggregator, StrategyPipeline};
use pond_session::LiveSession;
use pond_store::{Database, PartnerRepo, SqliteLogSource};
use pond_telemetry::SqliteLogSink;

use crate::handlers;

/// Server configuration.
pub struct ServerConfig {
    pub port: u16,
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 7071,
            bind_addr: "0.0.0.0".to_string(),
        }
    }
}

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<LiveSession>,
    pub aggregator: Arc<ScoreAggregator>,
    pub formatter: Arc<ReportFormatter>,
    pub source: Arc<SqliteLogSource>,
    pub partners: Arc<PartnerRepo>,
    /// Persisted warn+ logs, absent when SQLite log persistence is off.
    pub logs: Option<Arc<SqliteLogSink>>,
}

impl AppState {
    pub fn new(
        db: Database,
        identity: SelfIdentity,
        engine: &EngineConfig,
        sink: Arc<dyn NotificationSink>,
        logs: Option<Arc<SqliteLogSink>>,
    ) -> Self {
        let session = LiveSession::new(db.clone(), identity.clone(), engine, sink);
        let aggregator =
            ScoreAggregator::new(StrategyPipeline::from_config(engine), identity);
        Self {
            session: Arc::new(session),
            aggregator: Arc::new(aggregator),
            formatter: Arc::new(ReportFormatter::new(&engine.tunables)),
            source: Arc::new(SqliteLogSource::new(db.clone())),
            partners: Arc::new(PartnerRepo::new(db)),
            logs,
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/messages", post(handlers::ingest))
        .route("/v1/scores", get(handlers::scores))
        .route("/v1/report", get(handlers::report))
        .route("/v1/partners", get(handlers::partners))
        .route("/v1/logs", get(handlers::logs))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. The handle keeps the serve task alive.
pub async fn start(
    config: ServerConfig,
    db: Database,
    identity: SelfIdentity,
    engine: EngineConfig,
    sink: Arc<dyn NotificationSink>,
    logs: Option<Arc<SqliteLogSink>>,
) -> Result<ServerHandle, std::io::Error> {
    let state = AppState::new(db, identity, &engine, sink, logs);
    let router = build_router(state);

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(port = local_addr.port(), "pond server started");

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        _server: server_handle,
    })
}

/// Handle returned by `start()` — keeps the serve task alive.
pub struct ServerHandle {
    pub port: u16,
    _server: tokio::task::JoinHandle<()>,
}
