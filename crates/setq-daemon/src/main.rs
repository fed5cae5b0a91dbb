//! setq-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads config, builds
//! the shared state, wires middleware, and starts the HTTP server.  All route
//! handlers live in `routes.rs`; all shared state types live in `state.rs`.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use setq_config::{load_layered_yaml, report_unused_keys, UnusedKeyPolicy};
use setq_daemon::{bootstrap, routes, state};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "setq-daemon")]
#[command(about = "Session-aware SET snapshot service", long_about = None)]
struct Args {
    /// Layered config paths in merge order (base -> env -> local).
    #[arg(long = "config", env = "SETQ_CONFIG", value_delimiter = ':')]
    config_paths: Vec<String>,

    /// Bind address; overrides server.addr.
    #[arg(long, env = "SETQ_DAEMON_ADDR")]
    addr: Option<SocketAddr>,

    /// Refuse to start when the config has keys the daemon does not read.
    #[arg(long, default_value_t = false)]
    strict_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let args = Args::parse();

    let paths: Vec<&str> = args.config_paths.iter().map(String::as_str).collect();
    let loaded = load_layered_yaml(&paths).context("config load failed")?;
    let policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let report = report_unused_keys(&loaded.config_json, policy)?;
    for key in &report.unused_leaf_pointers {
        warn!(key = %key, "config key is not read by setq-daemon");
    }
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");

    let cfg = loaded.service()?;
    let orchestrator = bootstrap::build_orchestrator(&cfg)?;
    info!(
        timezone = %orchestrator.calendar().timezone(),
        session = %orchestrator.current_session(),
        "session calendar ready"
    );

    // Start the uptime clock at boot, not at the first health request.
    let _ = state::uptime_secs();

    let shared = Arc::new(state::AppState::new(Arc::new(orchestrator)));

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(bootstrap::cors_layer(&cfg.server.cors_origins));

    let addr = bootstrap::resolve_bind_addr(args.addr, &cfg)?;
    info!("setq-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler failed; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
