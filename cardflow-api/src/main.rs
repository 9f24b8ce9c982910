//! # Cardflow API Server
//!
//! HTTP server for the Cardflow board backend, providing endpoints for
//! board, list, task, and membership mutations with dense display
//! ordering maintained under concurrent edits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p cardflow-api
//! ```

use cardflow_api::{
    app::{build_router, AppState},
    config::Config,
};
use cardflow_shared::{
    db::{migrations::run_migrations, pool::create_pool, pool::DatabaseConfig},
    notify::{NullNotifier, RedisNotifier},
    service::BoardService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cardflow_api=debug,cardflow_shared=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Cardflow API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    // Without Redis the server still works; viewers just don't get
    // change fan-out.
    let service = match &config.redis_url {
        Some(url) => BoardService::new(pool, RedisNotifier::connect(url).await?),
        None => {
            tracing::warn!("REDIS_URL not set, change notifications disabled");
            BoardService::new(pool, NullNotifier)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(service, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown handler: {}", e);
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
