//! Backend entry-point: loads configuration, prepares storage and serves the API.

mod server;

use actix_web::web;
use cookbook::inbound::http::health::HealthState;
use cookbook::inbound::http::session_config::{BuildMode, session_settings_from_env};
use cookbook::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppConfig, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let app_config =
        AppConfig::load().map_err(|e| std::io::Error::other(format!("configuration: {e}")))?;
    let session =
        session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .map_err(|e| std::io::Error::other(format!("session configuration: {e}")))?;
    let bind_addr = app_config.bind_addr().map_err(std::io::Error::other)?;
    let bootstrap_admin = app_config
        .bootstrap_admin()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_bootstrap_admin(bootstrap_admin);

    match app_config.database_url.as_deref() {
        Some(database_url) => {
            run_migrations(database_url)
                .await
                .map_err(|e| std::io::Error::other(format!("migrations: {e}")))?;
            let pool = DbPool::new(
                PoolConfig::new(database_url).with_max_size(app_config.db_max_connections()),
            )
            .await
            .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
            config = config.with_db_pool(pool);
            info!("using PostgreSQL storage");
        }
        None => warn!("COOKBOOK_DATABASE_URL not set; data is kept in memory only"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "server listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
