//! # Jobdesk Server
//!
//! Main entry point. The first argument selects the command:
//! - **serve** (default): bootstrap the stack and run until shutdown
//! - **seed**: replace all data with the development data set
//! - **reindex**: rebuild the search indices from the store

use jobdesk_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use jobdesk_core::{JobdeskError, JobdeskResult};
use jobdesk_repository::DatabasePoolInterface;
use jobdesk_server::di::{build_app_module, StorageResolver};
use jobdesk_server::maintenance::{ensure_seed_allowed, Maintenance};
use jobdesk_server::startup::{print_startup_info, Command};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Application error: {}", e);
        eprintln!("Application error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> JobdeskResult<()> {
    let command = Command::from_args(std::env::args())?;

    // Load configuration
    let config_loader = ConfigLoader::from_default_location()?;
    let config = config_loader.get().await;

    init_logging(&config.observability);

    info!("Starting Jobdesk ({:?})...", command);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if command == Command::Seed {
        ensure_seed_allowed(&config.app)?;
    }

    if config.observability.metrics_enabled {
        init_metrics(&config.observability)?;
    }
    jobdesk_service::metrics::register_metrics();

    let module = build_app_module(&config).await?;
    let db_pool = module.database_pool();
    db_pool.health_check().await?;

    let result = match command {
        Command::Serve => serve(&config, db_pool.as_ref()).await,
        Command::Seed => {
            migrate(&config, db_pool.as_ref()).await?;
            Maintenance::from_module(module.as_ref()).seed().await.map(|_| ())
        }
        Command::Reindex => Maintenance::from_module(module.as_ref())
            .reindex()
            .await
            .map(|_| ()),
    };

    db_pool.close().await;
    result
}

async fn migrate(config: &AppConfig, db_pool: &dyn DatabasePoolInterface) -> JobdeskResult<()> {
    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }
    Ok(())
}

async fn serve(config: &AppConfig, db_pool: &dyn DatabasePoolInterface) -> JobdeskResult<()> {
    migrate(config, db_pool).await?;
    print_startup_info(config);

    shutdown_signal().await;

    info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},jobdesk=debug", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

fn init_metrics(config: &ObservabilityConfig) -> JobdeskResult<()> {
    let addr: SocketAddr = config.metrics_addr.parse().map_err(|e| {
        JobdeskError::Configuration(format!("Invalid metrics address '{}': {}", config.metrics_addr, e))
    })?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| JobdeskError::Internal(format!("Failed to install metrics exporter: {}", e)))?;

    info!("Prometheus exporter listening on http://{}/metrics", addr);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
