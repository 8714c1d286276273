use axum::middleware::from_fn;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::{env, net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

mod components;
mod config;
mod controllers;
mod db_ops;
mod errors;
mod geocode;
mod ingest;
mod middleware;
mod models;
mod routes;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let db = create_pg_pool().await;
    sqlx::migrate!()
        .run(&db)
        .await
        .expect("migrations to apply cleanly");

    let geocoder = Arc::new(
        geocode::Nominatim::new().expect("geocoding client to build"),
    );
    let state = models::AppState { db, geocoder };
    let app = routes::get_routes()
        .layer(from_fn(middleware::html_headers))
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    tracing::info!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .unwrap();
}

/// Connection parameters come from the environment, with defaults that suit
/// a local dev database.
async fn create_pg_pool() -> sqlx::Pool<sqlx::Postgres> {
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
    let name = env::var("DB_NAME").unwrap_or_else(|_| "brokerio".to_string());
    let user = env::var("DB_USER").unwrap_or_else(|_| "brokerio".to_string());
    let pass = env::var("DB_PASS").unwrap_or_else(|_| "brokerio".to_string());
    let db_url = format!("postgres://{user}:{pass}@{host}:{port}/{name}");

    PgPoolOptions::new()
        // Postgres default max connections is 100, and we'll take 'em
        // https://www.postgresql.org/docs/current/runtime-config-connection.html
        .max_connections(80)
        .connect(&db_url)
        .await
        .expect("pool to be able to connect")
}
