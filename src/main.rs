//! StarkFinder Backend Server
//!
//! HTTP API for user accounts and deployed contract records, backed by
//! PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tokio::signal;

use starkfinder_backend::{
    app::{build_router, configure_cors},
    auth::JwtIssuer,
    config::Config,
    db,
    middleware,
    routes::ContractRateLimiters,
    state::AppState,
    store::{PgContractStore, PgUserStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = config.environment.as_str(), "Starting StarkFinder backend");

    tracing::info!("Connecting to database at {}", config.database_url_masked());
    let db_pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        db::run_migrations(&db_pool).await?;
    }

    let app_state = AppState::from_backends(
        Arc::new(PgUserStore::new(db_pool.clone())),
        Arc::new(PgContractStore::new(db_pool.clone())),
        Arc::new(JwtIssuer::new(
            &config.jwt_secret,
            config.jwt_access_token_ttl_seconds,
        )),
        config.bcrypt_cost,
    );

    let limiters = ContractRateLimiters::new(&config.rate_limits);

    // Expired windows are swept once per window length
    let sweeper = limiters.clone();
    let sweep_every = config.rate_limits.window.max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sweeper.cleanup().await;
        }
    });

    let health_db_pool = db_pool.clone();
    let mut app = Router::new()
        .route("/health", get(move || health_check(health_db_pool.clone())))
        .merge(build_router(app_state, limiters))
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    if config.environment.is_production() {
        app = app.layer(axum::middleware::from_fn(middleware::hsts_header));
    }

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST and PORT do not form a socket address")?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

async fn health_check(pool: PgPool) -> Json<HealthResponse> {
    let (status, database) = match db::check_health(&pool).await {
        Ok(()) => ("healthy", "connected".to_string()),
        Err(e) => ("unhealthy", format!("error: {}", e)),
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
