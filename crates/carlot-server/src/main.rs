//! Carlot server binary.
//!
//! Loads configuration, sets up structured logging, resets and seeds the
//! database, then serves the car API until SIGTERM/SIGINT.

use carlot_server::{app, config, init_state};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("CARLOT_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            // No subscriber is installed yet.
            eprintln!("carlot: cannot load configuration: {e}");
            std::process::exit(2);
        }
    };

    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // The schema is reset and seeded before the listener exists.
    let state = match init_state(&config.database) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "database startup failed, refusing to serve");
            std::process::exit(1);
        }
    };

    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting carlot server");

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "cannot listen on configured address");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "carlot server stopped with an error");
        std::process::exit(1);
    }

    tracing::info!("carlot server shut down");
}

/// Resolves once the process is asked to stop, after logging which signal
/// arrived.
async fn shutdown_signal() {
    let signal = wait_for_stop().await;
    tracing::info!(signal, "stop requested, draining in-flight requests");
}

#[cfg(unix)]
async fn wait_for_stop() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "SIGTERM handler unavailable, only Ctrl+C stops the server");
            return wait_for_ctrl_c().await;
        }
    };

    tokio::select! {
        name = wait_for_ctrl_c() => name,
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn wait_for_stop() -> &'static str {
    wait_for_ctrl_c().await
}

async fn wait_for_ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Ctrl+C handler unavailable");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}
