//! Wayfinder
//!
//! Navigation demo server and resolution CLI.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wayfinder_kernel::menu::{NavRequest, split_roles};
use wayfinder_kernel::{AppState, Config, routes};

#[derive(Parser)]
#[command(name = "wayfinder", about = "Navigation resolution server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the demo handlers over HTTP (default).
    Serve,
    /// Resolve one navigation context and print it as JSON.
    Resolve {
        /// Context to resolve.
        #[arg(long)]
        context: String,
        /// Controller of the current route.
        #[arg(long, default_value = "Home")]
        controller: String,
        /// Action of the current route.
        #[arg(long, default_value = "Index")]
        action: String,
        /// Caller roles (comma-separated). Omit to skip role filtering.
        #[arg(long)]
        roles: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let state = AppState::new(&config).context("failed to initialize application state")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config, state).await,
        Command::Resolve {
            context,
            controller,
            action,
            roles,
        } => {
            let mut request =
                NavRequest::new(controller, action).with_catalog(Arc::clone(state.catalog()));
            if let Some(roles) = roles.as_deref() {
                request = request.with_user_roles(split_roles(roles));
            }

            let items = state
                .engine()
                .resolve(&request, &context)
                .with_context(|| format!("failed to resolve context '{context}'"))?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }
    }
}

async fn serve(config: &Config, state: AppState) -> Result<()> {
    info!(
        port = config.port,
        contexts = ?config.nav_contexts,
        "Starting Wayfinder"
    );

    let app = routes::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
