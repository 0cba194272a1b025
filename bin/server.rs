// SWIFT Code Registry - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use swift_registry::api::{build_router, AppState};
use swift_registry::{config, init_tracing, open_database, verify_count, Config};

#[derive(Parser)]
#[command(name = "swift-server", version, about = "SWIFT/BIC code REST API")]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = config::load_dotenv();
    init_tracing();
    if let Some(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let Cli { config } = Cli::parse();

    let conn = open_database(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    let count = verify_count(&conn)?;
    tracing::info!(path = %config.database_path.display(), records = count, "database ready");

    let bind_addr = config.bind_addr.clone();
    let app = build_router(AppState::new(conn, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;

    tracing::info!("swift-server listening on {bind_addr}");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
