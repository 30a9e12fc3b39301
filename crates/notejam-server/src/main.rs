mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use config::{Config, Profile};
use notejam_api::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notejam=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = Config::from_env()?;
    if config.profile == Profile::Production && config.secret_key == config::DEV_SECRET {
        warn!("production profile is running with the development secret key");
    }

    // Init database; the testing profile runs entirely in memory
    let db = if config.testing {
        notejam_db::Database::open_in_memory()?
    } else {
        notejam_db::Database::open(&PathBuf::from(&config.db_path))?
    };

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        secret_key: config.secret_key.clone(),
    });

    let app = notejam_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Notejam server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
