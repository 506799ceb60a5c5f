use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::info;

use atrio_api::auth::{self, AppStateInner};
use atrio_api::token::TokenService;
use atrio_api::upload::MediaStore;

/// Placeholder signing secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrio=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = std::env::var("ATRIO_JWT_SECRET").unwrap_or_default();
    if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
        eprintln!("FATAL: ATRIO_JWT_SECRET is unset or still a placeholder.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let host = std::env::var("ATRIO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ATRIO_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let db_path: PathBuf = std::env::var("ATRIO_DB_PATH")
        .unwrap_or_else(|_| "atrio.db".into())
        .into();
    let public_dir: PathBuf = std::env::var("ATRIO_PUBLIC_DIR")
        .unwrap_or_else(|_| "./public".into())
        .into();
    let token_ttl_hours: i64 = std::env::var("ATRIO_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(24);
    let admin_user = std::env::var("ATRIO_ADMIN_USER").unwrap_or_else(|_| "admin".into());
    let stats_public = std::env::var("ATRIO_STATS_PUBLIC")
        .map(|v| v == "true")
        .unwrap_or(false);

    // Init database, seeding the admin account on first run
    let db = atrio_db::Database::open(&db_path)?;
    if db.count_admins()? == 0 {
        let admin_password = std::env::var("ATRIO_ADMIN_PASSWORD").unwrap_or_default();
        if admin_password.is_empty() {
            eprintln!("FATAL: no admin account exists and ATRIO_ADMIN_PASSWORD is unset.");
            eprintln!("       Set it for the first start; it is only read to seed the account.");
            std::process::exit(1);
        }
        auth::seed_admin(&db, &admin_user, &admin_password)?;
    }

    // Shared state
    let media = MediaStore::new(&public_dir).await?;
    let tokens = TokenService::new(&jwt_secret, chrono::Duration::hours(token_ttl_hours));
    let state = Arc::new(AppStateInner { db, tokens, media });

    // Routes: the JSON API under /api; everything else comes from the public
    // dir with index.html as the SPA fallback. Uploads are live at /uploads/
    let static_files = ServeDir::new(&public_dir)
        .not_found_service(ServeFile::new(public_dir.join("index.html")));

    let app = atrio_api::router(state, stats_public)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(256 * 1024 * 1024)) // gallery batch: 20 files x 10 MB
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Atrio server listening on {}", addr);
    info!("Serving static files from {}", public_dir.display());
    if stats_public {
        info!("/api/stats is public");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
