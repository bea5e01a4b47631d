use anyhow::Context;
use ciz_roster::api::{router, AppState};
use ciz_roster::utils::{logger, validation::Validate};
use ciz_roster::{AppConfig, RestBackend};
use clap::Parser;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "ciz-server")]
#[command(about = "HTTP API for employees, ciz points and events")]
struct ServerArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "ciz.toml")]
    config: String,

    /// Override server.bind from the config file
    #[arg(long)]
    bind: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    let mut config = AppConfig::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config))?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Err(e) = config.validate() {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        return Err(e.into());
    }

    logger::init_server_logger(config.logging.json, args.verbose);

    let backend = Arc::new(RestBackend::new(config.backend_settings())?);
    let state = AppState::new(backend, config.import_settings());
    let app = router(state, config.server.body_limit_bytes);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("🚀 ciz-server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
