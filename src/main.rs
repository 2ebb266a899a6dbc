use cashbook::{
    config::{self, database},
    core::seed::seed_reference_data,
    errors::{Error, Result},
    web,
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cashbook", about = "Cash-flow bookkeeping with a small web UI.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and seed reference data, then exit
    InitDb,
    /// Start the web server (default)
    Serve {
        /// Interface to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; non-fatal, env vars can be set externally
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect, provision the schema and seed reference data
    let database_url = database::get_database_url(app_config.database.url.as_deref());
    let db = prepare_database(&database_url, &app_config.seed)
        .await
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Run the requested command
    match cli.command {
        Some(Command::InitDb) => {
            info!("Database ready");
            Ok(())
        }
        Some(Command::Serve { host, port }) => {
            let addr = listen_addr(
                host.as_deref().unwrap_or(&app_config.server.host),
                port.unwrap_or(app_config.server.port),
            )?;
            web::serve(addr, db).await
        }
        None => {
            let addr = listen_addr(&app_config.server.host, app_config.server.port)?;
            web::serve(addr, db).await
        }
    }
}

async fn prepare_database(
    database_url: &str,
    seed: &config::seed::SeedConfig,
) -> Result<DatabaseConnection> {
    let db = database::create_connection(database_url).await?;
    database::create_tables(&db).await?;
    seed_reference_data(&db, seed).await?;
    Ok(db)
}

fn listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Config {
            message: format!("Server host '{host}' did not resolve to an address"),
        })
}
