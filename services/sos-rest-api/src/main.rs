//! SOS REST API Server
//!
//! RESTful binding of the observations resource for an SOS 2.0 service.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use sos_rest_api::config::load_binding_config;
use sos_rest_api::state::AppState;

/// SOS REST API Server
#[derive(Parser, Debug)]
#[command(name = "sos-rest-api")]
#[command(about = "RESTful observations binding for an SOS 2.0 service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "SOS_LISTEN_ADDR")]
    listen: String,

    /// Binding configuration file (YAML)
    #[arg(short, long, env = "SOS_CONFIG")]
    config: Option<String>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "SOS_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let result = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")
        .and_then(|runtime| runtime.block_on(run_server(args)));

    if let Err(e) = result {
        eprintln!("sos-rest-api: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting SOS REST API server");

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let config = load_binding_config(args.config.as_deref())?;
    let state = Arc::new(AppState::new(config).with_prometheus(prometheus_handle));

    let app = sos_rest_api::app(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("SOS REST API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
