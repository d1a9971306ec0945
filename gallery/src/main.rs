use clap::Parser;
use gallery::{Application, Config, telemetry};

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The OTLP exporter builds a rustls client, which needs a process-wide provider
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = gallery::config::Args::parse();
    let config = Config::load(&args)?;

    if args.validate {
        println!(
            "Configuration is valid. Uploads go to {} and are served under {}.",
            config.storage.dir.display(),
            config.storage.url_prefix
        );
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;

    tracing::debug!("{:?}", args);
    tracing::info!(
        storage_dir = %config.storage.dir.display(),
        url_prefix = %config.storage.url_prefix,
        max_gallery_files = config.uploads.max_gallery_files,
        max_request_size = config.uploads.max_request_size,
        "Storing uploads under {}",
        config.storage.resolved_dir().display()
    );

    let shutdown = shutdown_signal();
    Application::new(config).await?.serve(shutdown).await
}
