//! `idledger-server`: the HTTP gateway binary

use anyhow::Context;
use clap::Parser;
use idledger::{Config, IdLedger};
use idledger_gateway::{router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Identity-record ledger HTTP server
#[derive(Debug, Parser)]
#[command(name = "idledger-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Address to listen on, overrides `gateway.bind`
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    if let Some(bind) = args.bind {
        config.gateway.bind = bind;
    }
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind = config.gateway.bind.clone();
    let service = Arc::new(IdLedger::open(config).context("ledger bootstrap failed")?);
    let app = router(AppState::new(Arc::clone(&service)));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot bind {}", bind))?;
    tracing::info!(%bind, "idledger-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    service.close();
    tracing::info!("idledger-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
