//! pakcache: a token-gated HTTP cache server for binary build artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use pakcache_api::create_router;
use pakcache_core::config::LogFormat;
use pakcache_core::Config;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => run_server(args).await,
        Commands::Version => {
            println!("pakcache {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_server(args: cli::ServeArgs) -> Result<()> {
    // Load configuration and apply CLI overrides
    let mut config = load_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(root) = args.root {
        config.storage.root = root;
    }

    // Initialize logging
    init_logging(&config);

    // A broken configuration must keep the server from becoming ready.
    config.validate().context("Invalid configuration")?;

    info!(
        root = %config.storage.root.display(),
        public_reads = config.auth.public_reads,
        enforce_extension = config.storage.enforced_extension().as_deref().unwrap_or("none"),
        "Artifact cache initialized"
    );

    let app = create_router(&config);
    let addr = config.server.bind;

    // Check if TLS is configured
    let tls_config = match (&config.server.tls_cert, &config.server.tls_key) {
        (Some(cert_path), Some(key_path)) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;
            let rustls_config =
                RustlsConfig::from_pem_file(cert_path, key_path).await.with_context(|| {
                    format!(
                        "Failed to load TLS certificates from {} and {}",
                        cert_path.display(),
                        key_path.display()
                    )
                })?;
            Some(rustls_config)
        }
        (Some(_), None) => {
            anyhow::bail!("TLS certificate specified but key is missing");
        }
        (None, Some(_)) => {
            anyhow::bail!("TLS key specified but certificate is missing");
        }
        (None, None) => None,
    };

    if let Some(tls_config) = tls_config {
        info!("Server listening on https://{} (TLS enabled)", addr);

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(std::time::Duration::from_secs(10)));
        });

        axum_server::bind_rustls(addr, tls_config)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("Server error")?;
    } else {
        let listener = TcpListener::bind(addr).await.context("Failed to bind to address")?;

        info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;
    }

    info!("Server shutdown complete");
    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).context("Failed to load configuration"),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(fmt_layer.json()).init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}
