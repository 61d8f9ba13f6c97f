//! Pdfplum HTTP API Server
//!
//! Materializes zipped Handlebars templates from object storage and serves
//! the rendered entry page, i.e. exactly what the PDF renderer would print.

use axum::{Router, extract::DefaultBodyLimit, response::Json, routing::get};
use pdfplum::{BlobStorage, FileStorage, Materializer, MaterializerConfig};
use serde_json::{Value, json};
use std::{net::SocketAddr, sync::Arc};
use time::format_description::well_known::Rfc3339;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod config;
mod error;
mod routes;

use config::{ServerConfig, StorageBackend};
use error::{ApiError, Result};

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub materializer: Arc<Materializer>,
    pub config: ServerConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            "pdfplum_server=debug,pdfplum=info,tower_http=debug".to_string()
        }))
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;
    info!(
        "Starting Pdfplum Server on {}:{}",
        config.host, config.port
    );

    // Initialize template storage
    let storage = build_storage(&config)?;

    // Prepare the directory materialized templates are written to
    let mut materializer_config = MaterializerConfig::default();
    if let Some(temp_dir) = &config.temp_dir {
        tokio::fs::create_dir_all(temp_dir).await?;
        materializer_config.temp_root = temp_dir.clone();
    }

    let materializer = Materializer::with_config(storage, materializer_config);
    info!(
        temp_root = %materializer.config().temp_root.display(),
        "Materializing templates into temporary directories"
    );

    // Create application state
    let state = AppState {
        materializer: Arc::new(materializer),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|_| ApiError::Config(format!("Invalid HOST value '{}'", config.host)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_storage(config: &ServerConfig) -> Result<Arc<dyn BlobStorage>> {
    match config.storage_backend {
        StorageBackend::File => {
            info!(root = %config.storage_root.display(), "Using file storage");
            Ok(Arc::new(FileStorage::new(&config.storage_root)))
        }
        #[cfg(feature = "s3")]
        StorageBackend::S3 => {
            info!("Using S3 storage");
            let storage = pdfplum::S3Storage::from_env()
                .map_err(|e| ApiError::Config(e.to_string()))?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "s3"))]
        StorageBackend::S3 => Err(ApiError::Config(
            "STORAGE_BACKEND=s3 requires the 's3' feature".to_string(),
        )),
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes::preview::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Result<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "pdfplum-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": time::OffsetDateTime::now_utc().format(&Rfc3339).ok()
    })))
}
