use anyhow::Context;
use dotenvy::dotenv;
use envconfig::Envconfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blog_server::{config::BlogServerConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_server=info,tower_http=debug".into()),
        )
        .init();

    let config = BlogServerConfig::init_from_env().context("Failed to load configuration")?;

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)
        .context("Invalid DATABASE_URL")?
        .create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect_with(connect_options)
        .await
        .context("Failed to create database pool")?;
    info!(database_url = %config.database_url, "Database connection pool established");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let addr = SocketAddr::new(config.http_host, config.http_port);
    let app = create_router(db_pool, config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
