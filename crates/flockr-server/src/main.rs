use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use flockr_api::avatars::DiskAvatarStore;
use flockr_core::{Flockr, FlockrConfig};

/// Secrets that must never reach a real deployment.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flockr=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let defaults = FlockrConfig::default();
    let jwt_secret = std::env::var("FLOCKR_JWT_SECRET").unwrap_or(defaults.jwt_secret);
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        warn!("FLOCKR_JWT_SECRET is unset or a placeholder; sessions can be forged");
    }
    let session_ttl = match std::env::var("FLOCKR_SESSION_TTL_HOURS") {
        Ok(hours) => chrono::Duration::hours(hours.parse()?),
        Err(_) => defaults.session_ttl,
    };
    let host = std::env::var("FLOCKR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FLOCKR_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let static_dir =
        PathBuf::from(std::env::var("FLOCKR_STATIC_DIR").unwrap_or_else(|_| "static".into()));
    let public_url = std::env::var("FLOCKR_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://localhost:{}", port));

    let avatars = DiskAvatarStore::new(static_dir.clone(), public_url).await?;

    let flockr = Flockr::builder(FlockrConfig {
        jwt_secret,
        session_ttl,
        ..defaults
    })
    .avatars(Arc::new(avatars))
    .build()?;

    let app = Router::new()
        .merge(flockr_api::routes(flockr))
        .nest_service("/static", ServeDir::new(&static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Flockr server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flockr server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            },
            Err(e) => {
                warn!("SIGTERM handler unavailable ({}), waiting for Ctrl+C", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
