use common::{
    env_config::Config,
    error::{AppError, Res},
};
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc};

pub mod predicate;
pub mod shape;
pub mod stats;

pub mod models {
    pub mod stats;
}

pub mod dtos {
    pub mod stats;
}

/// Creates the shared connection pool and checks that the database answers.
///
/// The statistics tables are owned by the POS schema, so nothing is created
/// or migrated here.
pub async fn setup(config: &Config) -> Result<Arc<PgPool>, Box<dyn std::error::Error>> {
    let pool_config = &config.db_pool;

    let mut options = PgConnectOptions::from_str(&config.database_url)?;
    if pool_config.require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .max_connections(pool_config.max_connections)
        .acquire_timeout(pool_config.acquire_timeout)
        .idle_timeout(pool_config.idle_timeout)
        .connect_with(options)
        .await?;

    ping(&pool).await?;
    log::info!(
        "Connected to database (max {} connections)",
        pool_config.max_connections
    );

    Ok(Arc::new(pool))
}

/// Round-trips a trivial statement on one pooled connection.
pub async fn ping(pool: &PgPool) -> Res<()> {
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT 1")
        .execute(&mut *conn)
        .await
        .map_err(AppError::from)?;
    Ok(())
}

/// Closes every pooled connection. Called once the HTTP server has stopped.
pub async fn shutdown(pool: &PgPool) {
    log::info!("Closing database pool...");
    pool.close().await;
    log::info!("Pool closed");
}
