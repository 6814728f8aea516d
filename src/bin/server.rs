use clap::Parser;
use qun_console::db::schema;
use qun_console::platform::{AdapterRegistry, onebot::OneBotAdapter};
use qun_console::server::config::ServerConfig;
use qun_console::web::{AppState, create_axum_router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<String>,
}

fn init_logging(log_dir: &str) -> WorkerGuard {
    // Log to a file: JSON format, daily rotation
    let (file_writer, guard) = tracing_appender::non_blocking(rolling::daily(log_dir, "console.log"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json();

    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sea_orm=warn,sqlx::query=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

fn build_adapter_registry(config: &ServerConfig) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();
    match &config.onebot_api_url {
        Some(api_url) => {
            info!(api_url = %api_url, "Registering OneBot adapter.");
            registry.register(Arc::new(OneBotAdapter::new(
                api_url.clone(),
                config.onebot_access_token.clone(),
            )));
        }
        None => warn!("ONEBOT_API_URL is not set; group ownership cannot be verified."),
    }
    registry
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let server_config = ServerConfig::load(args.config.as_deref())?;
    let _log_guard = init_logging(&server_config.log_dir);
    info!("Starting group configuration console.");
    let server_config = Arc::new(server_config);

    // --- Database Setup ---
    let mut opt = ConnectOptions::new(server_config.database_url.clone());
    opt.max_connections(10).sqlx_logging(false);
    let db_pool: DatabaseConnection = match Database::connect(opt).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to the database.");
            return Err(e.into());
        }
    };
    if let Err(e) = schema::create_group_tables(&db_pool).await {
        error!(error = %e, "Failed to create group configuration tables.");
        return Err(e.into());
    }

    // --- Platform Adapters ---
    let adapters = Arc::new(build_adapter_registry(&server_config));

    // --- Axum HTTP Server Setup ---
    let app_state = AppState::new(db_pool, adapters, server_config.clone());
    let app = create_axum_router(app_state);

    let addr: SocketAddr = server_config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "HTTP server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
