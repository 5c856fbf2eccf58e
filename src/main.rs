mod analytics;
mod db;
mod domain;
mod error;
mod middleware;
mod state;
mod web;

use crate::db::seed;
use crate::state::SharedState;
use axum::{routing::get_service, Router};
use base64::{engine::general_purpose, Engine as _};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tower_http::{services::ServeDir, services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL missing");
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            e
        })?;
    tracing::info!("Database migrations completed");

    let session_key_b64 = std::env::var("SESSION_KEY").expect("SESSION_KEY missing");
    let session_key = general_purpose::STANDARD
        .decode(session_key_b64)
        .expect("SESSION_KEY must be base64");

    seed::seed_owner(&pool).await?;

    let shared: SharedState = Arc::new(state::AppState { pool, session_key });

    // Evict idle entries from the in-memory rate limiters every hour.
    let scheduler = JobScheduler::new().await?;
    scheduler
        .add(Job::new_async("0 0 * * * *", move |_uuid, _l| {
            Box::pin(async move {
                web::public::prune_rate_limiter().await;
                web::auth::prune_rate_limiter().await;
            })
        })?)
        .await?;
    scheduler.start().await?;
    tracing::info!("Scheduler started: rate limiter prune hourly");

    let static_handler = ServeDir::new("static").not_found_service(ServeFile::new("index.html"));

    let app = Router::new()
        .merge(web::routes(shared.clone()))
        .nest_service("/static", ServeDir::new("static"))
        .fallback_service(get_service(static_handler))
        .layer(TraceLayer::new_for_http());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("0.0.0.0:{}", port)
    });
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
