//! the `serve` subcommand - runs the gateway.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use color_eyre::eyre::{bail, Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use fmgateway_db::FmgDb;
use fmgateway_types::{parse_interval, Config, DatabaseConfig, ProcessorConfig};

use crate::blob_store::LocalBlobStore;
use crate::pipeline::FileWorker;
use crate::{create_app, AppState};

/// run the gateway: http api plus the file integration worker.
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// database url (sqlite:// or postgres://); overrides the FMG_DB* triple
    #[arg(long, env = "FMG_DATABASE_URL")]
    database_url: Option<String>,

    /// relational store host
    #[arg(long, env = "FMG_DBHOST")]
    db_host: Option<String>,

    /// relational store user
    #[arg(long, env = "FMG_DBUSER")]
    db_user: Option<String>,

    /// relational store password
    #[arg(long, env = "FMG_DBPASS")]
    db_pass: Option<String>,

    /// address to listen on
    #[arg(long, default_value = "0.0.0.0:8080", env = "FMG_LISTEN_ADDR")]
    listen_addr: String,

    /// base directory for blob storage
    #[arg(long, default_value = "./tmp/blobs", env = "FMG_BLOB_BASE_PATH")]
    blob_base_path: PathBuf,

    /// drop directory scanned by the processor
    #[arg(long, default_value = "./tmp/source", env = "FMG_PROCESSOR_SOURCE_DIR")]
    source_dir: PathBuf,

    /// quarantine-while-working directory
    #[arg(
        long,
        default_value = "./tmp/inprogress",
        env = "FMG_PROCESSOR_INPROGRESS_DIR"
    )]
    inprogress_dir: PathBuf,

    /// output directory for artifacts
    #[arg(
        long,
        default_value = "./tmp/destination",
        env = "FMG_PROCESSOR_DESTINATION_DIR"
    )]
    destination_dir: PathBuf,

    /// destination for failed originals
    #[arg(long, default_value = "./tmp/errors", env = "FMG_PROCESSOR_ERROR_DIR")]
    error_dir: PathBuf,

    /// processor tick period (e.g. "30s", "5m")
    #[arg(long, default_value = "30s", env = "FMG_PROCESSOR_INTERVAL")]
    interval: String,

    /// log level
    #[arg(long, default_value = "info", env = "FMG_LOG_LEVEL")]
    log_level: String,
}

impl ServeCommand {
    /// convert cli arguments into a Config struct.
    fn into_config(self) -> Result<Config> {
        let database = if let Some(db_url) = self.database_url {
            if db_url.starts_with("postgres://") {
                DatabaseConfig {
                    db_type: "postgres".to_string(),
                    connection_string: db_url,
                }
            } else if let Some(path) = db_url.strip_prefix("sqlite://") {
                DatabaseConfig {
                    db_type: "sqlite".to_string(),
                    connection_string: path.to_string(),
                }
            } else {
                bail!("database URL must start with sqlite:// or postgres://");
            }
        } else {
            // missing credentials are a fatal startup error
            match (self.db_host, self.db_user, self.db_pass) {
                (Some(host), Some(user), Some(pass)) => DatabaseConfig::postgres(&host, &user, &pass),
                _ => bail!("FMG_DBHOST, FMG_DBUSER and FMG_DBPASS must be set (or FMG_DATABASE_URL)"),
            }
        };

        let interval = match parse_interval(&self.interval) {
            Some(interval) => interval,
            None => {
                warn!(
                    provided = %self.interval,
                    "invalid processor interval, using default 30s"
                );
                Duration::from_secs(30)
            }
        };

        Ok(Config {
            listen_addr: self.listen_addr,
            blob_base_path: self.blob_base_path,
            database,
            processor: ProcessorConfig {
                source_dir: self.source_dir,
                inprogress_dir: self.inprogress_dir,
                destination_dir: self.destination_dir,
                error_dir: self.error_dir,
                interval,
            },
        })
    }

    /// run the serve command.
    pub async fn run(self) -> Result<()> {
        let log_level = match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        info!("starting fmgateway...");

        let config = self.into_config()?;
        info!("Database: {}", config.database.connection_string);
        info!("Listen address: {}", config.listen_addr);
        info!("Source directory: {}", config.processor.source_dir.display());

        // ensure parent directory exists for sqlite databases
        if config.database.db_type == "sqlite" {
            let db_path = std::path::Path::new(&config.database.connection_string);
            if let Some(parent) = db_path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                info!("Creating database directory: {:?}", parent);
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create database directory: {:?}", parent))?;
            }
        }

        let db = FmgDb::new(&config)
            .await
            .context("failed to initialize database")?;
        info!("Database initialized successfully");

        let blobs = LocalBlobStore::new(config.blob_base_path.clone())
            .await
            .context("failed to initialize blob store")?;

        let state = AppState::new(db, blobs, config.clone());

        // file integration worker with drain-on-shutdown
        let worker = FileWorker::new(config.processor.clone(), state.documents.clone());
        worker
            .ensure_directories()
            .await
            .context("failed to create processor directories")?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker_handle = tokio::spawn(worker.run(shutdown_rx));
        info!("File integration worker started");

        let app = create_app(state);
        let addr: SocketAddr = config
            .listen_addr
            .parse()
            .context("invalid listen address")?;
        info!("starting http server on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await
            .context("server error")?;

        // stop ticking and wait for in-flight batches
        let _ = shutdown_tx.send(true);
        worker_handle.await.context("worker task panicked")?;
        info!("all services stopped");

        Ok(())
    }
}
