use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use dotenvy::dotenv;
use ed25519_dalek::SigningKey;
use envconfig::Envconfig;
use rand::rngs::OsRng;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use blog_server::config::BlogServerConfig;
use blog_server::repositories::user_repository;
use blog_server::seeder::{seed_database, DEMO_USERNAME};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let config = BlogServerConfig::init_from_env().context("Failed to load configuration")?;
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let existing = user_repository::get_user_by_username(&pool, DEMO_USERNAME).await?;
    let user_id = match existing {
        Some(user) => {
            info!(user_id = user.id, "Demo user exists, keeping its key");
            seed_database(&pool, &user.public_key).await?
        }
        None => {
            // Fresh key for the demo account; print the secret so it can sign challenges.
            let signing_key = SigningKey::generate(&mut OsRng);
            let public_key = signing_key.verifying_key().to_bytes();
            let user_id = seed_database(&pool, &public_key).await?;
            println!(
                "Demo user secret key (base64): {}",
                BASE64_STANDARD.encode(signing_key.to_bytes())
            );
            user_id
        }
    };
    info!(user_id, "Seeding complete");

    Ok(())
}
