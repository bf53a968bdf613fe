// ============================
// crates/backend-bin/src/main.rs
// ============================
//! Home-inventory auth server entry point.
use anyhow::Context;
use backend_lib::{
    config::Settings,
    routes,
    storage::FlatFileDirectory,
    AppState,
};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "homeinv-auth", about = "Home-inventory authentication server")]
struct Cli {
    /// Explicit TOML config file (defaults to ./config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the user directory location
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,
}

fn init_tracing(level: &str, json: bool) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(bind) = cli.bind {
        settings.bind_addr = bind;
    }
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    init_tracing(&settings.log_level, cli.json);

    if settings.auth.uses_dev_signing_key() {
        warn!("using the built-in development signing key; set HOMEINV_AUTH__SIGNING_KEY");
    }

    let directory = FlatFileDirectory::new(&settings.data_dir)
        .with_context(|| format!("opening user directory at {}", settings.data_dir.display()))?;

    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(Arc::new(directory), settings));
    let app = routes::create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
