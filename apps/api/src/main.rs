mod config;
mod db;
mod errors;
mod github_client;
mod models;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, S3Settings};
use crate::db::create_pool;
use crate::github_client::GitHubClient;
use crate::resume::archive::ExportArchive;
use crate::resume::store::{MemoryResumeStore, PgResumeStore, ResumeStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Résumé store: Postgres when configured, in-memory otherwise
    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let store = PgResumeStore::new(create_pool(url).await?);
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; résumés are kept in memory and lost on restart");
            Arc::new(MemoryResumeStore::new())
        }
    };

    // Export archive (S3 / MinIO)
    let archive = match &config.s3 {
        Some(s3) => {
            let archive = ExportArchive::new(build_s3_client(s3).await, s3.bucket.clone());
            info!("Export archive enabled (bucket: {})", s3.bucket);
            Some(archive)
        }
        None => {
            info!("S3_BUCKET not set; exports are returned inline only");
            None
        }
    };

    let github = GitHubClient::new(config.github_api_url.clone(), config.github_token.clone());
    info!("GitHub client initialized ({})", config.github_api_url);

    let state = AppState {
        store,
        archive,
        github,
    };

    // TODO: restrict origins once the editor's deploy domain is fixed
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for MinIO (explicit endpoint and keys) or AWS
/// (default provider chain).
async fn build_s3_client(s3: &S3Settings) -> aws_sdk_s3::Client {
    let mut loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(Region::new("us-east-1"));

    if let (Some(key_id), Some(secret)) = (&s3.access_key_id, &s3.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "resume-api-static",
        ));
    }
    if let Some(endpoint) = &s3.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if s3.endpoint.is_some() {
        // MinIO serves buckets by path, not by subdomain
        builder = builder.force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}
