pub(crate) mod controllers;
pub(crate) mod core;
pub(crate) mod routes;
pub(crate) mod storage;
pub(crate) mod store;
pub(crate) mod types;
pub(crate) mod utils;

use std::sync::Arc;

use chrono::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::config::{Args, Backend};
use crate::core::error::ConfigError as Error;
use crate::core::state::AppState;
use crate::storage::ImageStore;
use crate::storage::gcs::GcsClient;
use crate::storage::memory::MemoryImageStore;
use crate::store::elastic::ElasticClient;
use crate::store::memory::MemoryStore;
use crate::store::{CredentialStore, PostStore};

const HASH_COST: u32 = 12;

pub async fn run() -> Result<(), Error> {
    let config = Args::load()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_default())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = reqwest::ClientBuilder::new()
        .user_agent(concat!("around/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let (credentials, posts): (Arc<dyn CredentialStore>, Arc<dyn PostStore>) =
        match config.document_backend()? {
            Backend::Remote => {
                let elastic = Arc::new(ElasticClient::new(
                    client.clone(),
                    &config.elasticsearch_url,
                    config.elasticsearch_username.clone(),
                    config.elasticsearch_password.clone(),
                    config.posts_index.clone(),
                    config.users_index.clone(),
                    config.max_search_results,
                ));

                elastic.ensure_indices().await?;

                tracing::info!("Using Elasticsearch at {}", config.elasticsearch_url);

                (
                    elastic.clone() as Arc<dyn CredentialStore>,
                    elastic as Arc<dyn PostStore>,
                )
            }
            Backend::Memory => {
                tracing::warn!("Using in-memory document store, nothing will be persisted");

                let memory = Arc::new(MemoryStore::new());
                (
                    memory.clone() as Arc<dyn CredentialStore>,
                    memory as Arc<dyn PostStore>,
                )
            }
        };

    let images: Arc<dyn ImageStore> = match config.image_backend()? {
        Backend::Remote => Arc::new(GcsClient::new(
            client,
            &config.gcs_url,
            config.bucket.clone(),
            config.gcs_access_token.clone(),
        )),
        Backend::Memory => {
            tracing::warn!("Using in-memory image store, nothing will be persisted");
            Arc::new(MemoryImageStore::new(config.bucket.clone()))
        }
    };

    let state = AppState::new(
        credentials,
        posts,
        images,
        &config.secret,
        Duration::hours(config.token_ttl_hours),
        HASH_COST,
    );

    let app = routes::router::routes(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(Error::IO)?;

    tracing::info!("started-service, listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::IO)?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
