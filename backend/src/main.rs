//! Fruits Backend - GraphQL API over fruits and their colors
//!
//! This is the main entry point for the fruits backend.
//! All operations are exposed via GraphQL at /graphql.

mod api;
mod app;
mod cli;
mod config;
mod db;
mod error;
mod graphql;

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::CliOptions;
use crate::config::Config;
use crate::db::Database;

pub use app::AppState;

const DB_RETRY_INTERVAL: Duration = Duration::from_secs(2);
const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fruits_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = CliOptions::from_args();
    if cli.print_schema {
        println!("{}", graphql::schema_sdl());
        return Ok(());
    }

    tracing::info!("Starting Fruits Backend");
    let config = Config::from_env()?;
    tracing::info!(database_url = %config.database_url, "Configuration loaded");

    if let Some(file) = config.database_file()
        && let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty())
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }

    let db = Database::connect_with_retry(
        &config.database_url,
        config.database_max_connections,
        DB_RETRY_INTERVAL,
        DB_CONNECT_TIMEOUT,
    )
    .await?;
    tracing::info!("Database connected");

    let sync = db::sync_all_entity_schemas(db.pool()).await;
    if !sync.errors.is_empty() {
        anyhow::bail!("Schema sync failed: {}", sync.errors.join("; "));
    }
    tracing::info!(
        tables_created = sync.tables_created.len(),
        columns_added = sync.columns_added.len(),
        "Schema synchronized"
    );

    if cli.seed || config.seed_demo_data {
        db::run_seeds(db.pool()).await.context("Seeding demo data")?;
    }

    let schema = graphql::build_schema(db.clone(), config.schema_limits);
    tracing::info!("GraphQL schema built");

    let state = AppState { db, schema };
    let app = app::build_app(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("axum::serve")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
