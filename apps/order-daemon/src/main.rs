//! Voice ordering WebSocket daemon
//!
//! Client devices send one JSON frame per utterance and receive one JSON frame
//! back. `/metrics` exposes Prometheus counters, `/healthz` answers `ok` and
//! `/` serves a browser console for sending frames by hand.

mod connection;
mod console;
mod metrics;

use anyhow::{bail, Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use connection::AppState;
use dialog_engine::{DialogEngine, EngineConfig, SessionStore};
use metrics::MetricsHub;
use nlu_client::{create_client, NluBackendKind, NluConfig};
use slot_matcher::{load_catalog_file, SlotCatalog};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "order-daemon")]
#[command(about = "Voice ordering dialog server")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// WebSocket route
    #[arg(long, default_value = "/chipotle")]
    path: String,

    /// NLU backend (mock, dialogflow)
    #[arg(long, default_value = "mock")]
    nlu_backend: String,

    /// Dialogflow project id
    #[arg(long, default_value = "chipotle-aeeb4")]
    project_id: String,

    /// Language code sent with every NLU query
    #[arg(long, default_value = "en")]
    language: String,

    /// Timeout for one NLU round trip
    #[arg(long, default_value = "5000")]
    nlu_timeout_ms: u64,

    /// YAML file overriding the built-in slot dictionaries
    #[arg(long)]
    dictionaries: Option<PathBuf>,

    /// Bearer token for the NLU service (falls back to NLU_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Fetch the NLU token from `gcloud auth application-default`
    #[arg(long)]
    gcloud_token: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    let args = Args::parse();
    if !args.path.starts_with('/') || args.path == "/" {
        bail!("--path must start with '/' and not be the console route, got {:?}", args.path);
    }

    info!("order-daemon starting");
    info!("NLU backend: {}", args.nlu_backend);

    slot_matcher::init().context("failed to init slot matcher")?;
    nlu_client::init().context("failed to init NLU client")?;
    dialog_engine::init().context("failed to init dialog engine")?;

    let catalog = match &args.dictionaries {
        Some(path) => load_catalog_file(path)?,
        None => SlotCatalog::builtin(),
    };
    info!("Loaded {} slot dictionaries", catalog.len());

    let backend = match args.nlu_backend.as_str() {
        "mock" => NluBackendKind::Mock,
        "dialogflow" => NluBackendKind::Dialogflow,
        other => bail!("Unknown NLU backend: {}", other),
    };
    let nlu_config = NluConfig {
        backend,
        project_id: args.project_id.clone(),
        language_code: args.language.clone(),
        timeout_ms: args.nlu_timeout_ms,
        access_token: args
            .token
            .clone()
            .or_else(|| std::env::var("NLU_ACCESS_TOKEN").ok()),
        use_gcloud_token: args.gcloud_token,
        ..NluConfig::default()
    };
    let nlu = create_client(nlu_config).context("failed to create NLU client")?;

    let engine = DialogEngine::new(
        Arc::new(catalog),
        Arc::new(SessionStore::new()),
        nlu,
        EngineConfig {
            nlu_timeout: Duration::from_millis(args.nlu_timeout_ms),
        },
    );
    let metrics = MetricsHub::new().context("failed to register metrics")?;
    let state = Arc::new(AppState { engine, metrics });

    let console_page = console::render(&args.path);
    let app = Router::new()
        .route("/", get(move || async move { console_page }))
        .route(&args.path, get(connection::ws_handler))
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    let local = listener
        .local_addr()
        .context("failed to read local listener address")?;
    info!(address = %local, path = %args.path, "listening for clients");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum server error")?;

    info!("order-daemon stopped");
    Ok(())
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics
        .dialog
        .pending_sessions
        .set(state.engine.store().len() as i64);
    state.metrics.encode_text()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}

fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
