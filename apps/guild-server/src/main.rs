mod config;
mod error;
mod handlers;
mod server;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use guild_store_sqlite::SqliteStore;

use config::ServerConfig;
use server::{build_router, GuildServer};

#[derive(Parser)]
#[command(name = "guild-server")]
#[command(about = "Guild admission platform server")]
struct Cli {
    /// Database URL (sqlite://path/to/db.db)
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server
    Serve {
        /// Server address
        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { addr } => serve(cli.database_url, addr).await,
    }
}

async fn serve(database_url: Option<String>, addr: String) -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let store = match &database_url {
        Some(url) => {
            info!(url = %url, "opening sqlite store");
            SqliteStore::open(url).await
        }
        None => SqliteStore::open_default().await,
    }
    .map_err(|e| anyhow::anyhow!("failed to open store: {e}"))?;

    let server = GuildServer::new(Arc::new(store), &config)?;

    if server.member_auth.has_default_salt() {
        warn!(
            "GUILD_MEMBER_SECRET_SALT is not set; member secret hashing uses the built-in \
             fallback salt. Set a salt in any real deployment."
        );
    }

    let router = build_router(server);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "guild-server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
