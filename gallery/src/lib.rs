//! # gallery: a small image upload server
//!
//! `gallery` accepts image uploads from HTML forms, stores them as flat files in one directory and
//! serves them back over static URLs. There is no authentication, no database and no image
//! processing: the filesystem is the only state.
//!
//! ## Request Flow
//!
//! - `GET /` renders a page with two forms, one for a single image and one for a gallery of up to
//!   ten images.
//! - `POST /upload` and `POST /gallery` stream each multipart file part into an
//!   [`storage::ImageStorage`], which picks the stored name (`<unix millis><.ext>` by default) and
//!   writes the bytes. The response is a short HTML snippet linking to the stored files.
//! - `GET /uploads/<stored name>` is answered by [`tower_http::services::ServeDir`] straight from
//!   the storage directory, with the content type guessed from the extension.
//!
//! ## Known hazard
//!
//! Stored names only carry millisecond resolution. Two uploads finishing in the same millisecond
//! with the same extension get the same name, and the later write silently replaces the earlier
//! file. Nothing coordinates concurrent requests beyond that.
//!
//! This holds inside a single gallery request too: files streamed within one millisecond share a
//! name, so the response can link the same stored file more than once. A failing request removes
//! the files it stored by name, so when its name collided with a file from a concurrent successful
//! request, that file is removed as well.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use gallery::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = gallery::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     gallery::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub mod test_utils;

use anyhow::Context;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};

use crate::api::views::Views;
use crate::storage::{ImageStorage, local::LocalImageStorage};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .storage(Arc::new(LocalImageStorage::new("uploads".into())))
///     .views(Arc::new(Views::new()?))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn ImageStorage>,
    pub views: Arc<Views>,
}

/// Build the application router.
///
/// Upload routes get the configured request body limit; the storage directory is mounted under
/// `storage.url_prefix`; anything else falls through to a plain-text 404.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.uploads.max_request_size;
    let upload_routes = Router::new()
        .route("/upload", post(api::handlers::uploads::upload_image))
        .route("/gallery", post(api::handlers::uploads::upload_gallery))
        .layer(DefaultBodyLimit::max(upload_limit));

    let static_files = ServeDir::new(&state.config.storage.dir);
    let url_prefix = state.config.storage.url_prefix.clone();

    Router::new()
        .route("/", get(api::handlers::pages::index))
        .route("/healthz", get(|| async { "OK" }))
        .merge(upload_routes)
        .with_state(state)
        .nest_service(&url_prefix, static_files)
        .fallback(api::handlers::pages::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns the router and configuration.
///
/// 1. **Create**: [`Application::new`] prepares the storage directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application backed by the local storage directory from `config`
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting gallery with configuration: {:#?}", config);

        let storage = LocalImageStorage::new(config.storage.dir.clone());
        storage
            .ensure_dir()
            .await
            .with_context(|| format!("Failed to create storage directory {}", config.storage.dir.display()))?;

        Self::with_storage(config, Arc::new(storage))
    }

    /// Create an application with an explicit storage backend
    pub fn with_storage(config: Config, storage: Arc<dyn ImageStorage>) -> anyhow::Result<Self> {
        let views = Views::new().context("Failed to compile page templates")?;

        let state = AppState::builder()
            .config(config.clone())
            .storage(storage)
            .views(Arc::new(views))
            .build();

        Ok(Self {
            router: build_router(state),
            config,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Gallery listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
