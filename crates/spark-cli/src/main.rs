mod config;
mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use clap::Parser;
use spark_core::{BuildError, RpcApp};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};
use crate::demo::{App, EXPECTED_METHODS};

#[derive(Debug, Parser)]
#[command(name = "spark", about = "Serve the demo handler as CBOR RPC over HTTP")]
struct Args {
    /// Path to the TOML config (created with defaults if missing)
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Write the TypeScript typedefs and exit
    #[arg(long)]
    emit_only: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// `[status] METHOD uri (latency)` を 1 リクエストごとに出す
async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    info!(
        "[{}] {} {} ({:?})",
        response.status().as_u16(),
        method,
        uri,
        started.elapsed()
    );
    response
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let args = Args::parse();
    let config = Config::load_or_create(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // (A) bind: 不合格のメソッドは warn、期待メソッドの欠落はここで失敗
    let app = RpcApp::builder(Arc::new(App))
        .expect_methods(EXPECTED_METHODS)
        .build()?;

    // (B) 型定義を書き出す（production では生成しない）
    if args.emit_only || !config.production {
        app.write_typedefs(&config.frontend.types_out)?;
    }
    if args.emit_only {
        return Ok(());
    }

    // (C) serve
    let router = app.router().layer(middleware::from_fn(log_request));
    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, prefix = app.prefix(), methods = app.bindings().len(), "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
