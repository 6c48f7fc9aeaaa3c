//! Tally CLI - service entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tally_rpc::{router, AppContext, ContextConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - budgets and transactions service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// SQLite database path (in-memory stores when omitted)
        #[arg(long)]
        database: Option<PathBuf>,

        /// Remote auth service base URL (in-process gate when omitted)
        #[arg(long)]
        auth_url: Option<Url>,

        /// Remote budget service base URL (in-process ledger when omitted)
        #[arg(long)]
        budget_url: Option<Url>,

        /// Timeout in seconds for remote dependency calls
        #[arg(long, default_value_t = 3)]
        remote_timeout: u64,
    },

    /// Mint a local test credential
    MintToken {
        /// Subject user id
        user: i64,
        /// Subject name
        name: String,
        /// Token lifetime in hours
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            database,
            auth_url,
            budget_url,
            remote_timeout,
        } => {
            let ctx = AppContext::new(ContextConfig {
                database,
                auth_url,
                budget_url,
                remote_timeout: Some(Duration::from_secs(remote_timeout)),
            })
            .await?;

            let app = router(Arc::new(ctx));
            let listener = tokio::net::TcpListener::bind(&listen).await?;
            info!(%listen, "tally listening");
            axum::serve(listener, app).await?;
        }

        Commands::MintToken {
            user,
            name,
            ttl_hours,
        } => {
            let token =
                tally_identity::mint_token(user, &name, chrono::Duration::hours(ttl_hours));
            println!("{token}");
        }
    }

    Ok(())
}
