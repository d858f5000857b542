//! Server runtime
//!
//! Wires configuration, database, router and metrics into a running HTTP
//! service with graceful shutdown.

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::init_database;
use crate::interfaces::http::{create_api_router, AppState, RouterOptions};
use crate::shared::{ShutdownCoordinator, ShutdownSignal};

/// The Prometheus recorder is process-global; install it once and hand out
/// clones of the handle afterwards.
static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn prometheus_handle() -> Option<PrometheusHandle> {
    if let Some(handle) = PROM_HANDLE.get() {
        return Some(handle.clone());
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(PROM_HANDLE.get_or_init(|| handle).clone()),
        Err(e) => {
            warn!("Metrics disabled, recorder could not be installed: {}", e);
            None
        }
    }
}

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run pending migrations before serving
    pub auto_migrate: bool,
}

impl ServerOptions {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            auto_migrate: true,
        }
    }
}

/// A running server; dropping it does not stop the server, call
/// [`shutdown`](Self::shutdown) or trigger the signal.
pub struct ServerHandle {
    pub local_addr: SocketAddr,
    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(options: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let config = options.config;
        config.validate()?;

        info!(
            "Starting ratebook-service v{} on {}:{}",
            env!("CARGO_PKG_VERSION"),
            config.server.api_host,
            config.server.api_port
        );

        let db = init_database(&config.database).await?;
        if options.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
        }

        let metrics = if config.server.metrics_enabled {
            prometheus_handle()
        } else {
            None
        };
        let identity = config.security.jwt_config();
        if identity.is_none() {
            warn!("Identity layer disabled, /api/v1 is open to any caller");
        }

        let state = AppState::new(db.clone(), config.resolver.clone());
        let router = create_api_router(state, RouterOptions { identity, metrics });

        let addr = format!("{}:{}", config.server.api_host, config.server.api_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI at http://{}/docs/", local_addr);

        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let signal = shutdown.signal();
        let api_task = tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.wait().await })
                .await;
            if let Err(e) = served {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Listen for SIGTERM/SIGINT and trigger shutdown on either.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }

    /// Wait for the server to drain, then close the database.
    pub async fn wait(self) {
        let drain = self.shutdown.timeout();
        match tokio::time::timeout(drain, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API task failed: {}", e),
            Err(_) => warn!("In-flight requests did not drain within {:?}", drain),
        }

        if let Err(e) = self.db.close().await {
            error!("Error closing database: {}", e);
        }
        info!("Shutdown complete");
    }

    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }
}

/// Set up the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.logging.format.eq_ignore_ascii_case("json") {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialised: {}", e);
    }
}
